//! Error types for rawout core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while running a write session.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Output consumer error.
    #[error("storage error: {0}")]
    Storage(#[from] rawout_storage::StorageError),

    /// Record encoding error.
    #[error("codec error: {0}")]
    Codec(#[from] rawout_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration, detected at session construction.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// The placement service could not provide a destination.
    #[error("placement failed: {message}")]
    Placement {
        /// Description of the failure.
        message: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a placement error.
    pub fn placement(message: impl Into<String>) -> Self {
        Self::Placement {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
