/// Core error type for the bot.
///
/// Adapter crates map their transport/HTTP errors into this type so the
/// dispatcher and transports can tell a dropped update from a failed call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("malformed update: {0}")]
    MalformedUpdate(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
