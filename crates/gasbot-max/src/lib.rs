//! MAX platform adapter: HTTP client, webhook server and process runner.

pub mod client;
pub mod runner;
pub mod webhook;
pub mod wire;

pub use client::MaxClient;
