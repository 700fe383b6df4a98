//! Core domain + application logic for the gas-utility customer-service bot.
//!
//! This crate is framework-agnostic. The messaging platform's HTTP API and
//! the webhook server live in the adapter crate behind the `BotApi` port.

pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod intent;
pub mod logging;
pub mod messaging;
pub mod polling;
pub mod router;
pub mod update;

pub use errors::{Error, Result};
