//! Error types shared by the scoring, analytics and messaging layers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed inbound payload. Rejected before it reaches a handler.
    #[error("invalid payload: {0}")]
    Validation(String),

    /// Patient identifier was never recorded.
    #[error("patient not found: {0}")]
    NotFound(String),

    /// A metric could not be scored (NaN or infinite value).
    #[error("cannot score metric {metric}: value {value} is not finite")]
    Computation { metric: &'static str, value: f64 },

    #[error("analytics store unavailable: lock poisoned")]
    StoreUnavailable,

    #[error("transport: {0}")]
    Transport(String),

    #[error("no handler registered for {0}")]
    NoHandler(&'static str),

    #[error("config: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Validation(e.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
