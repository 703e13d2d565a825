//! Stand-ins for the live store service, so routing can be inspected from
//! a terminal.

use {
    async_trait::async_trait,
    fleet_accounts::BuiltinRunner,
    fleet_commands::{ActionHandler, ActionRequest},
    fleet_common::{AccessLevel, BotHandle, format_bot_response},
    tracing::info,
};

/// Answers every action with what would have been performed.
pub struct DryRunActions;

#[async_trait]
impl ActionHandler for DryRunActions {
    async fn perform(&self, request: ActionRequest<'_>) -> anyhow::Result<Option<String>> {
        info!(
            bot = %request.bot,
            action = %request.action,
            access = %request.access,
            "dry-run action"
        );
        let text = if request.args.is_empty() {
            format!("would perform {}", request.action)
        } else {
            format!("would perform {} with {:?}", request.action, request.args)
        };
        Ok(Some(format_bot_response(request.bot, text)))
    }
}

/// Answers built-in commands with the command line they would have run.
pub struct DryRunBuiltins;

#[async_trait]
impl BuiltinRunner for DryRunBuiltins {
    async fn run(
        &self,
        bot: &BotHandle,
        access: AccessLevel,
        command_line: &str,
        _caller_id: u64,
    ) -> anyhow::Result<Option<String>> {
        info!(bot = %bot, %access, command_line, "dry-run built-in");
        Ok(Some(format_bot_response(
            bot,
            format!("would run built-in `{command_line}`"),
        )))
    }
}
