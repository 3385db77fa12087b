//! Core domain + dispatch logic for psybot.
//!
//! This crate is framework-agnostic. Telegram and SQLite live behind ports (traits)
//! implemented in adapter crates.

pub mod admin;
pub mod commands;
pub mod config;
pub mod content;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod menu;
pub mod messaging;
pub mod ports;
pub mod response;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{Error, Result};
