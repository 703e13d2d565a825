use {
    async_trait::async_trait,
    fleet_common::{AccessLevel, BotHandle},
};

/// What the dispatcher needs from whoever owns the accounts.
#[async_trait]
pub trait BotManager: Send + Sync {
    /// Whether the account currently has a live, logged-on session.
    fn is_connected(&self, bot: &BotHandle) -> bool;

    /// Resolve one requested name to account handles.
    ///
    /// Matching is case-insensitive. A single name may expand to several
    /// handles (group keywords, patterns). Unknown names yield an empty list.
    fn identify(&self, name: &str) -> Vec<BotHandle>;

    /// Run one of the host's own built-in commands on `bot` and return its
    /// reply. Authorization of the built-in is the host's business.
    async fn run_builtin(
        &self,
        bot: &BotHandle,
        access: AccessLevel,
        command_line: &str,
        caller_id: u64,
    ) -> anyhow::Result<Option<String>>;

    /// The host's own version report. Only used for diagnostics.
    async fn version_report(&self) -> anyhow::Result<Option<String>>;

    /// Discovery-queue access, when the host grants it.
    fn discovery_queue(&self) -> Option<&dyn DiscoveryQueue> {
        None
    }
}

/// Executes host built-in commands for [`BotRegistry`](crate::BotRegistry).
#[async_trait]
pub trait BuiltinRunner: Send + Sync {
    async fn run(
        &self,
        bot: &BotHandle,
        access: AccessLevel,
        command_line: &str,
        caller_id: u64,
    ) -> anyhow::Result<Option<String>>;
}

/// Optional host capability: walk an account's store discovery queue.
#[async_trait]
pub trait DiscoveryQueue: Send + Sync {
    async fn explore(&self, bot: &BotHandle) -> anyhow::Result<()>;
}
