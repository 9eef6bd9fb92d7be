//! Error types for salescope.

use thiserror::Error;

/// Result type alias using salescope's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for salescope operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Backend scan failed (network/store error)
    #[error("Scan error: {0}")]
    Scan(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
