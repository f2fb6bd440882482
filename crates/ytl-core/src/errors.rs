/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can handle failures consistently (user-facing message vs logged only).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("{operation} timed out after {millis}ms")]
    Timeout { operation: &'static str, millis: u128 },

    /// A video store operation ran past its query bound.
    #[error("store {operation} timed out after {millis}ms")]
    StoreTimeout { operation: &'static str, millis: u128 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Failures of the video store (including its timeouts) are answered with
    /// "try again later" instead of bubbling up to the transport.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::Store(_) | Error::StoreTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
