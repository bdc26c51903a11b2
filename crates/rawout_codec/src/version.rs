//! Record format versions and their header layouts.
//!
//! The header layout changed several times over the deployed history of
//! the format. Each version family is a [`Layout`] variant that knows its
//! header size, its checksum algorithm and where the checksum word lives.
//!
//! ```text
//! v1,v2 | version | run | lumi | event | size[0] .. size[1023] |
//! v3    | version | run | lumi | event | payload | checksum | reserved |
//! v4    | version | run | lumi | event | event_hi | payload | checksum | reserved |
//! v5    | version | run | lumi | event | payload | checksum |
//! v6    | version|flags<<16 | run | lumi | event | payload | checksum |
//! ```

use crate::checksum::ChecksumKind;
use crate::error::{CodecError, CodecResult};
use std::fmt;

/// Size of a header word in bytes.
pub const WORD_SIZE: usize = 4;

/// Number of per-source size entries in the legacy header table.
pub const LEGACY_SOURCE_COUNT: usize = 1024;

/// Largest source id a fragment collection may carry.
pub const MAX_SOURCE_ID: u32 = 4096;

/// Oldest supported format version.
pub const MIN_VERSION: u32 = 1;

/// Newest supported format version.
pub const MAX_VERSION: u32 = 6;

/// Flag bit set when the event is real (not simulated) data.
pub const FLAG_IS_REAL_DATA: u16 = 0x0001;

/// Flag bit set on every record produced by this encoder.
pub const FLAG_FROM_OUTPUT_MODULE: u16 = 0x0002;

/// A validated record format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion(u32);

impl FormatVersion {
    /// Validates and wraps a raw version number.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnsupportedVersion`] outside `1..=6`.
    pub fn new(version: u32) -> CodecResult<Self> {
        if (MIN_VERSION..=MAX_VERSION).contains(&version) {
            Ok(Self(version))
        } else {
            Err(CodecError::UnsupportedVersion { version })
        }
    }

    /// Returns the raw version number.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the header layout for this version.
    #[must_use]
    pub const fn layout(self) -> Layout {
        match self.0 {
            1 | 2 => Layout::SizeTable,
            3 => Layout::Adler32Reserved,
            4 => Layout::Adler32WideEvent,
            5 => Layout::Crc32c,
            _ => Layout::Crc32cFlagged,
        }
    }

    /// Number of source ids considered when encoding.
    #[must_use]
    pub const fn source_count(self) -> usize {
        self.layout().source_count()
    }

    /// Header size in bytes.
    #[must_use]
    pub const fn header_size(self) -> usize {
        self.layout().header_size()
    }
}

impl TryFrom<u32> for FormatVersion {
    type Error = CodecError;

    fn try_from(version: u32) -> CodecResult<Self> {
        Self::new(version)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Header layout of one version family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Versions 1 and 2: identity words followed by a 1024-entry size table.
    SizeTable,
    /// Version 3: payload size, Adler-32, one reserved word.
    Adler32Reserved,
    /// Version 4: like version 3 with a reserved high event-id word.
    Adler32WideEvent,
    /// Version 5: payload size and CRC-32C.
    Crc32c,
    /// Version 6: like version 5 with flags in the upper half of word 0.
    Crc32cFlagged,
}

impl Layout {
    /// Header size in bytes.
    #[must_use]
    pub const fn header_size(self) -> usize {
        let words = match self {
            Self::SizeTable => 4 + LEGACY_SOURCE_COUNT,
            Self::Adler32Reserved => 7,
            Self::Adler32WideEvent => 8,
            Self::Crc32c | Self::Crc32cFlagged => 6,
        };
        words * WORD_SIZE
    }

    /// Number of source ids considered when encoding.
    #[must_use]
    pub const fn source_count(self) -> usize {
        match self {
            Self::SizeTable => LEGACY_SOURCE_COUNT,
            _ => MAX_SOURCE_ID as usize + 1,
        }
    }

    /// Checksum algorithm, if this layout carries one.
    #[must_use]
    pub const fn checksum(self) -> Option<ChecksumKind> {
        match self {
            Self::SizeTable => None,
            Self::Adler32Reserved | Self::Adler32WideEvent => Some(ChecksumKind::Adler32),
            Self::Crc32c | Self::Crc32cFlagged => Some(ChecksumKind::Crc32c),
        }
    }

    /// Byte offset of the aggregate payload size word.
    #[must_use]
    pub const fn payload_size_offset(self) -> Option<usize> {
        match self {
            Self::SizeTable => None,
            Self::Adler32WideEvent => Some(5 * WORD_SIZE),
            Self::Adler32Reserved | Self::Crc32c | Self::Crc32cFlagged => Some(4 * WORD_SIZE),
        }
    }

    /// Byte offset of the checksum word.
    #[must_use]
    pub const fn checksum_offset(self) -> Option<usize> {
        match self.payload_size_offset() {
            Some(offset) => Some(offset + WORD_SIZE),
            None => None,
        }
    }

    /// Whether word 0 carries flags in its upper 16 bits.
    #[must_use]
    pub const fn has_flags(self) -> bool {
        matches!(self, Self::Crc32cFlagged)
    }

    /// Whether the header carries a reserved high event-id word.
    #[must_use]
    pub const fn has_event_high(self) -> bool {
        matches!(self, Self::Adler32WideEvent)
    }

    /// Whether the header ends with a reserved zero word.
    #[must_use]
    pub const fn has_trailing_reserved(self) -> bool {
        matches!(self, Self::Adler32Reserved | Self::Adler32WideEvent)
    }
}
