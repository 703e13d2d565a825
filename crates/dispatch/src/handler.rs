use {
    async_trait::async_trait,
    fleet_accounts::BotManager,
    fleet_common::{AccessLevel, BotHandle, format_bot_response, format_static_response},
};

use crate::{
    alias::AliasTable,
    invocation::{Invocation, Params},
    options::DispatchOptions,
};

/// Everything a handler sees for one target account.
pub struct CommandContext<'a> {
    /// The account this call acts on.
    pub bot: &'a BotHandle,
    pub invocation: &'a Invocation,
    /// Arguments left over once target names are consumed.
    pub params: Params<'a>,
    pub bots: &'a dyn BotManager,
    pub table: &'a AliasTable,
    pub options: &'a DispatchOptions,
}

impl CommandContext<'_> {
    pub fn access(&self) -> AccessLevel {
        self.invocation.access()
    }

    /// Reply prefixed with the target account's name.
    pub fn reply(&self, text: impl AsRef<str>) -> Option<String> {
        Some(format_bot_response(self.bot, text))
    }

    /// Reply prefixed with the dispatcher's response tag.
    pub fn static_reply(&self, text: impl AsRef<str>) -> Option<String> {
        Some(format_static_response(&self.options.response_tag, text))
    }
}

/// One concrete feature invoked by the dispatcher.
///
/// Returning `Ok(None)` means "nothing to say"; such results are dropped
/// from fan-out aggregation.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &str;

    /// When true the dispatcher answers "Not connected!" for offline
    /// targets instead of calling [`handle`](Self::handle).
    fn requires_connection(&self) -> bool {
        false
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> anyhow::Result<Option<String>>;
}
