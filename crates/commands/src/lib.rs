//! The bot's command catalog.
//!
//! [`build_catalog`] registers every verb and alias in both shapes. Remote
//! account features are routed to a host-provided [`ActionHandler`]; the
//! handlers in [`builtin`], [`help`], [`keys`], [`version`] and
//! [`explorer`] are implemented here.

pub mod action;
pub mod builtin;
pub mod catalog;
pub mod explorer;
pub mod help;
pub mod keys;
pub mod version;

pub use {
    action::{Action, ActionCommand, ActionHandler, ActionRequest, ArgStyle},
    catalog::build_catalog,
};
