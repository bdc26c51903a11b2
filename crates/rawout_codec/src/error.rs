//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during record encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The requested record format version is not supported.
    #[error("unsupported record format version: {version}")]
    UnsupportedVersion {
        /// The rejected version number.
        version: u32,
    },

    /// A fragment was supplied for a source id outside the valid range.
    #[error("source id {source_id} exceeds maximum {max}")]
    InvalidSourceId {
        /// The rejected source id.
        source_id: u32,
        /// The largest accepted source id.
        max: u32,
    },

    /// The record size cannot be represented in the header.
    #[error("record size overflow: {message}")]
    SizeOverflow {
        /// Description of the overflow.
        message: String,
    },

    /// The encoded record did not come out at the precomputed size.
    #[error("record size mismatch: expected {expected} bytes, wrote {actual}")]
    SizeMismatch {
        /// Size computed before encoding.
        expected: usize,
        /// Bytes actually written.
        actual: usize,
    },

    /// A write would have run past the end of the work buffer.
    #[error("buffer overrun: writing {len} bytes at offset {offset} into {capacity} bytes")]
    BufferOverrun {
        /// Offset of the attempted write.
        offset: usize,
        /// Length of the attempted write.
        len: usize,
        /// Capacity of the buffer.
        capacity: usize,
    },

    /// Input ended before a complete record could be read.
    #[error("truncated record: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// The stored checksum does not match the payload.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum stored in the header.
        expected: u32,
        /// Checksum computed over the payload.
        actual: u32,
    },

    /// The record or fragment is structurally invalid.
    #[error("invalid record structure: {message}")]
    InvalidStructure {
        /// Description of the structural error.
        message: String,
    },
}

impl CodecError {
    /// Create a size overflow error.
    pub fn size_overflow(message: impl Into<String>) -> Self {
        Self::SizeOverflow {
            message: message.into(),
        }
    }

    /// Create an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Create a truncation error.
    pub fn truncated(needed: usize, available: usize) -> Self {
        Self::Truncated { needed, available }
    }
}
