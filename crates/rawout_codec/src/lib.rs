//! # rawout Codec
//!
//! Versioned binary encoding of raw event records.
//!
//! A record carries one event's raw fragments, keyed by source id, behind a
//! small header of identity words. Six header layouts have been deployed;
//! all of them are produced bit for bit:
//!
//! | Version | Header | Checksum |
//! |---|---|---|
//! | 1, 2 | version, run, lumi, event, 1024 sizes | none |
//! | 3 | version, run, lumi, event, payload, checksum, reserved | Adler-32 |
//! | 4 | version, run, lumi, event, event_hi, payload, checksum, reserved | Adler-32 |
//! | 5 | version, run, lumi, event, payload, checksum | CRC-32C |
//! | 6 | version\|flags, run, lumi, event, payload, checksum | CRC-32C |
//!
//! Empty fragments take no space in the payload.
//!
//! ## Usage
//!
//! ```
//! use rawout_codec::{decode, encode, EventIdentity, FormatVersion, FragmentCollection};
//!
//! let mut fragments = FragmentCollection::new();
//! fragments.insert(0, vec![0u8; 8]).unwrap();
//!
//! let version = FormatVersion::new(5).unwrap();
//! let record = encode(version, &EventIdentity::new(1, 1, 1), true, &fragments).unwrap();
//! assert_eq!(record.total_size(), 24 + 8);
//!
//! let decoded = decode(record.as_bytes()).unwrap();
//! assert_eq!(decoded.identity.event, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod checksum;
mod cursor;
mod decoder;
mod encoder;
mod error;
pub mod fed;
mod fragment;
mod version;

pub use checksum::ChecksumKind;
pub use cursor::WordCursor;
pub use decoder::{decode, record_len, DecodedRecord, RecordIterator};
pub use encoder::{encode, Record, RecordEncoder};
pub use error::{CodecError, CodecResult};
pub use fragment::{EventIdentity, FragmentCollection};
pub use version::{
    FormatVersion, Layout, FLAG_FROM_OUTPUT_MODULE, FLAG_IS_REAL_DATA, LEGACY_SOURCE_COUNT,
    MAX_SOURCE_ID, MAX_VERSION, MIN_VERSION, WORD_SIZE,
};
