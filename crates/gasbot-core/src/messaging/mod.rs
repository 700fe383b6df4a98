//! Platform-facing abstractions: the outbound port and the reply model.

pub mod port;
pub mod types;
