use std::time::Duration;

use fleet_config::DispatchConfig;

/// Immutable dispatcher settings, fixed when the [`Dispatcher`] is built.
///
/// [`Dispatcher`]: crate::Dispatcher
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub dev_features: bool,
    pub name_delimiter: char,
    pub failure_log_delay: Duration,
    pub response_tag: String,
    pub version_marker: char,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for DispatchOptions {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            dev_features: config.dev_features,
            name_delimiter: config.name_delimiter,
            failure_log_delay: Duration::from_millis(config.failure_log_delay_ms),
            response_tag: config.response_tag.clone(),
            version_marker: config.version_marker,
        }
    }
}
