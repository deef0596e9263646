//! Error types for the TTRelay application.

use thiserror::Error;

/// A shared error type for the relay application.
///
/// Provider call failures deliberately do not appear here: they are
/// absorbed at the router boundary and turned into user-facing reply
/// text (see [`crate::provider::ProviderError`]).
#[derive(Error, Debug)]
pub enum RelayError {
    /// Configuration error (missing/invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (settings file operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Transport send/receive failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<std::io::Error> for RelayError {
    fn from(e: std::io::Error) -> Self {
        RelayError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Serialization {
            format: "JSON".to_string(),
            message: e.to_string(),
        }
    }
}

/// Convenient Result alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
