//! Error types for framelink-core

use thiserror::Error;

/// Result type alias using framelink-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in framelink-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// An authenticated operation was invoked before any session was acquired
    #[error("{0} requires an active session")]
    Precondition(&'static str),

    /// Missing or invalid caller-supplied arguments
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The service rejected the request at the application layer
    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    /// Transport-level failure (connection, timeout, malformed payload)
    #[error("Network error: {0}")]
    Network(String),

    /// A polled operation reached an explicit failure state
    #[error("{operation} failed with state {state}")]
    PollFailed {
        operation: &'static str,
        state: String,
    },

    /// The polling attempt budget was exhausted
    #[error("{operation} timed out after {attempts} attempts")]
    PollTimeout {
        operation: &'static str,
        attempts: u32,
    },

    /// Client configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Whether the error came from the transport rather than the service.
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Network(format!("malformed response payload: {error}"))
    }
}
