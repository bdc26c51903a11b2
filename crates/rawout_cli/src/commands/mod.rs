//! CLI command implementations.

pub mod generate;
pub mod inspect;
pub mod verify;

use thiserror::Error;

/// Errors reported by the commands themselves.
#[derive(Debug, Error)]
pub enum CliError {
    /// Unknown `--format` value.
    #[error("unsupported output format: {0} (expected text or json)")]
    InvalidFormat(String),

    /// A path holds no raw files.
    #[error("no raw files found at {0}")]
    NoRawFiles(String),

    /// Option out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// One or more files failed verification.
    #[error("verification failed: {failed} of {checked} files")]
    VerificationFailed {
        /// Files with errors.
        failed: usize,
        /// Files checked.
        checked: usize,
    },
}
