use {
    async_trait::async_trait,
    fleet_dispatch::{CommandContext, CommandHandler},
    tracing::info,
};

const UNAVAILABLE: &str = "Discovery queue exploration is unavailable on this host";

/// Walks the target account's discovery queue, when the host grants the
/// capability.
pub struct ExploreQueue;

#[async_trait]
impl CommandHandler for ExploreQueue {
    fn name(&self) -> &str {
        "explore_queue"
    }

    fn requires_connection(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> anyhow::Result<Option<String>> {
        let Some(queue) = ctx.bots.discovery_queue() else {
            return Ok(ctx.reply(UNAVAILABLE));
        };
        queue.explore(ctx.bot).await?;
        info!(bot = %ctx.bot, "discovery queue explored");
        Ok(ctx.reply("Discovery queue explored"))
    }
}
