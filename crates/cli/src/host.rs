use std::sync::Arc;

use {
    fleet_accounts::BotRegistry,
    fleet_commands::build_catalog,
    fleet_config::FleetConfig,
    fleet_dispatch::{DispatchOptions, Dispatcher},
    tracing::info,
};

use crate::dry_run::{DryRunActions, DryRunBuiltins};

/// Account used when the config lists none.
pub const DEFAULT_ACCOUNT: &str = "main";

/// Registry, catalog and dispatcher wired from config, with dry-run
/// stand-ins for the store service.
pub fn build_dispatcher(config: &FleetConfig) -> anyhow::Result<Dispatcher> {
    let registry = BotRegistry::from_config(&config.host, &config.accounts)?
        .with_builtin(Arc::new(DryRunBuiltins));
    if config.accounts.is_empty() {
        registry.add(DEFAULT_ACCOUNT, &[], true)?;
        info!(bot = DEFAULT_ACCOUNT, "no accounts configured, using a default one");
    }

    let table = build_catalog(Arc::new(DryRunActions))?;
    Ok(Dispatcher::new(
        Arc::new(table),
        Arc::new(registry),
        DispatchOptions::from(&config.dispatch),
    ))
}

/// `--bot`, else the first configured account.
pub fn origin_name(config: &FleetConfig, requested: Option<&str>) -> String {
    requested
        .map(str::to_string)
        .or_else(|| config.accounts.first().map(|a| a.name.clone()))
        .unwrap_or_else(|| DEFAULT_ACCOUNT.to_string())
}
