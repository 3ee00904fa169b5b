//! Server error types.

use std::io;
use thiserror::Error;

use roomsign_core::TracingError;
use roomsign_providers::SourceError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error (bind, file read, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A calendar source failed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Tracing setup failed.
    #[error("Tracing error: {0}")]
    Tracing(#[from] TracingError),
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
