//! Account management seam for the dispatcher.
//!
//! The dispatcher only talks to accounts through [`BotManager`]. Hosts that
//! own real sessions implement it themselves; [`BotRegistry`] is an
//! in-memory implementation driven by config, used by the CLI and tests.

pub mod error;
pub mod manager;
pub mod matcher;
pub mod registry;

pub use {
    error::{Error, Result},
    manager::{BotManager, BuiltinRunner, DiscoveryQueue},
    registry::BotRegistry,
};
