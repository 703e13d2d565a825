/// Config schema types (dispatch options, in-memory host, managed accounts).
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub dispatch: DispatchConfig,
    pub host: HostConfig,
    pub accounts: Vec<AccountConfig>,
}

/// Options read by the command dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Expose the owner-only developer command set.
    pub dev_features: bool,
    /// Separator for bot name lists (`bot1,bot2`).
    pub name_delimiter: char,
    /// Delay before a failure diagnostic is written to the log.
    pub failure_log_delay_ms: u64,
    /// Tag used for replies that are not about a single bot (`<fleet> ...`).
    pub response_tag: String,
    /// Character that starts the version number in the host's version report.
    pub version_marker: char,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            dev_features: false,
            name_delimiter: ',',
            failure_log_delay_ms: 500,
            response_tag: "fleet".into(),
            version_marker: 'V',
        }
    }
}

/// Settings for the built-in in-memory host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Text returned as the host's own version report.
    pub version: String,
    /// Name that expands to every managed account.
    pub all_keyword: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: format!("<fleet> fleet V{}", env!("CARGO_PKG_VERSION")),
            all_keyword: "ALL".into(),
        }
    }
}

/// One managed account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub name: String,
    /// Whether the account starts out connected.
    pub connected: bool,
    /// Extra names that resolve to this account.
    pub aliases: Vec<String>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            connected: true,
            aliases: Vec::new(),
        }
    }
}
