//! Error types for output consumers.

use std::io;
use thiserror::Error;

/// Result type for consumer operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while writing records to a destination.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A record was written before any destination was opened.
    #[error("no destination initialized")]
    NotInitialized,

    /// The consumer has been stopped.
    #[error("consumer is stopped")]
    Stopped,

    /// The consumer does not accept records through this channel.
    #[error("consumer does not support hand-off of records")]
    HandOffUnsupported,

    /// The consumer only accepts records through hand-off.
    #[error("consumer is in shared mode; records must be handed off")]
    SharedMode,
}
