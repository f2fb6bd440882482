//! Core domain + application logic for the YouTube link bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / yt-dlp / PostgreSQL
//! live behind ports (traits) implemented in adapter crates.

pub mod callback;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod flow;
pub mod formatting;
pub mod listing;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod store;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{Error, Result};
