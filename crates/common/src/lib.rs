//! Shared types, error definitions, and response helpers used across all
//! fleet crates.

pub mod error;
pub mod response;
pub mod types;

pub use {
    error::{Error, FromMessage, Result, labelled},
    response::{format_bot_response, format_static_response},
    types::{AccessLevel, BotHandle},
};
