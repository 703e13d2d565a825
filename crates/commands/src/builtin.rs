//! Shorthands that expand to one of the host's own commands.

use {
    async_trait::async_trait,
    fleet_dispatch::{CommandContext, CommandHandler},
    tracing::debug,
};

/// Runs `command` (plus the raw parameter text, when `pass_tail` is set) as
/// a host built-in on the target account.
pub struct BuiltinShortcut {
    command: &'static str,
    pass_tail: bool,
}

impl BuiltinShortcut {
    /// Fixed command line, parameters ignored.
    pub fn fixed(command: &'static str) -> Self {
        Self {
            command,
            pass_tail: false,
        }
    }

    /// `command` followed by the caller's parameters, spacing preserved.
    pub fn with_tail(command: &'static str) -> Self {
        Self {
            command,
            pass_tail: true,
        }
    }

    fn command_line(&self, ctx: &CommandContext<'_>) -> String {
        let tail = ctx.params.tail(0);
        if self.pass_tail && !tail.is_empty() {
            format!("{} {tail}", self.command)
        } else {
            self.command.to_string()
        }
    }
}

#[async_trait]
impl CommandHandler for BuiltinShortcut {
    fn name(&self) -> &str {
        self.command
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> anyhow::Result<Option<String>> {
        let line = self.command_line(ctx);
        debug!(bot = %ctx.bot, command_line = %line, "forwarding to host built-in");
        ctx.bots
            .run_builtin(ctx.bot, ctx.access(), &line, ctx.invocation.caller_id())
            .await
    }
}
