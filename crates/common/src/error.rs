use thiserror::Error;

use crate::Rejection;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No grammar registered for tag '{0}'")]
    UnknownTag(String),

    #[error("Invalid signal: {0}")]
    InvalidSignal(Rejection),

    #[error("Reference price must be positive and finite, got {0}")]
    InvalidReferencePrice(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for messages that were understood to be noise or malformed,
    /// as opposed to caller or setup mistakes.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::InvalidSignal(_))
    }
}

impl From<Rejection> for Error {
    fn from(reason: Rejection) -> Self {
        Error::InvalidSignal(reason)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
