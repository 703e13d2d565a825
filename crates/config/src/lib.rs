//! Configuration loading, validation, and env substitution.
//!
//! Config files: `fleet.toml`, `fleet.yaml`, or `fleet.json`
//! Searched in `./` then `~/.config/fleet/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, find_config_file, load_config},
    schema::{AccountConfig, DispatchConfig, FleetConfig, HostConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
