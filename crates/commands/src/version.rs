use {
    async_trait::async_trait,
    fleet_dispatch::{CommandContext, CommandHandler},
};

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reports this command set's own version.
pub struct OwnVersion;

#[async_trait]
impl CommandHandler for OwnVersion {
    fn name(&self) -> &str {
        "own_version"
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> anyhow::Result<Option<String>> {
        Ok(ctx.static_reply(format!("{NAME} V{VERSION}")))
    }
}
