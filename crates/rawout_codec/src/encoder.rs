//! Record encoder.

use crate::cursor::WordCursor;
use crate::error::{CodecError, CodecResult};
use crate::fragment::{EventIdentity, FragmentCollection};
use crate::version::{
    FormatVersion, Layout, FLAG_FROM_OUTPUT_MODULE, FLAG_IS_REAL_DATA, LEGACY_SOURCE_COUNT,
};
use std::fmt;

/// One fully encoded event record.
///
/// The bytes are complete and checksummed; a `Record` is never observed
/// half-built.
#[derive(Clone, PartialEq, Eq)]
pub struct Record {
    version: FormatVersion,
    bytes: Vec<u8>,
}

impl Record {
    /// Version the record was encoded with.
    #[must_use]
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Total record size in bytes (header plus payload).
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.bytes.len()
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn payload_size(&self) -> usize {
        self.bytes.len() - self.version.header_size()
    }

    /// Encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the record, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for Record {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("version", &self.version)
            .field("total_size", &self.bytes.len())
            .finish()
    }
}

/// Encodes one event into a record.
///
/// `flags_enabled` only matters for layouts that carry flags (version 6);
/// when it is `false` the flag half-word is written as zero.
///
/// # Errors
///
/// Returns an encoding defect error (`SizeOverflow`, `BufferOverrun`,
/// `SizeMismatch`) if the record cannot be laid out consistently. These
/// indicate a logic error and are never retried.
pub fn encode(
    version: FormatVersion,
    identity: &EventIdentity,
    flags_enabled: bool,
    fragments: &FragmentCollection,
) -> CodecResult<Record> {
    let layout = version.layout();
    let source_count = version.source_count();
    let header_size = layout.header_size();

    let payload_len = fragments.payload_len(source_count);
    let payload_word = u32::try_from(payload_len).map_err(|_| {
        CodecError::size_overflow(format!("payload of {payload_len} bytes exceeds u32"))
    })?;
    let expected_size = header_size
        .checked_add(payload_len)
        .ok_or_else(|| CodecError::size_overflow("header plus payload overflows usize"))?;

    let mut cursor = WordCursor::with_size(expected_size);

    if layout.has_flags() {
        let flags = if flags_enabled {
            let mut flags = FLAG_FROM_OUTPUT_MODULE;
            if identity.is_real_data {
                flags |= FLAG_IS_REAL_DATA;
            }
            flags
        } else {
            0
        };
        cursor.put_u32((version.as_u32() & 0xFFFF) | (u32::from(flags) << 16))?;
    } else {
        cursor.put_u32(version.as_u32())?;
    }
    cursor.put_u32(identity.run)?;
    cursor.put_u32(identity.lumi)?;
    cursor.put_u32(identity.event)?;
    if layout.has_event_high() {
        // reserved high part of a 64-bit event id
        cursor.put_u32(0)?;
    }

    if layout == Layout::SizeTable {
        write_size_table(&mut cursor, fragments)?;
    } else {
        cursor.put_u32(payload_word)?;
        cursor.put_u32(0)?;
        if layout.has_trailing_reserved() {
            cursor.put_u32(0)?;
        }
    }

    debug_assert_eq!(cursor.position(), header_size);

    for (_, data) in fragments.iter_below(source_count) {
        cursor.put_bytes(data)?;
    }

    if let (Some(kind), Some(offset)) = (layout.checksum(), layout.checksum_offset()) {
        let checksum = kind.compute(cursor.written_from(header_size));
        cursor.patch_u32(offset, checksum)?;
    }

    Ok(Record {
        version,
        bytes: cursor.finish()?,
    })
}

fn write_size_table(cursor: &mut WordCursor, fragments: &FragmentCollection) -> CodecResult<()> {
    let mut sizes = [0u32; LEGACY_SOURCE_COUNT];
    for (id, data) in fragments.iter_below(LEGACY_SOURCE_COUNT) {
        sizes[id as usize] = u32::try_from(data.len()).map_err(|_| {
            CodecError::size_overflow(format!("fragment {id} of {} bytes exceeds u32", data.len()))
        })?;
    }
    for size in sizes {
        cursor.put_u32(size)?;
    }
    Ok(())
}

/// Encoder bound to one format version for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordEncoder {
    version: FormatVersion,
    flags_enabled: bool,
}

impl RecordEncoder {
    /// Creates an encoder.
    #[must_use]
    pub const fn new(version: FormatVersion, flags_enabled: bool) -> Self {
        Self {
            version,
            flags_enabled,
        }
    }

    /// The configured version.
    #[must_use]
    pub const fn version(&self) -> FormatVersion {
        self.version
    }

    /// Whether optional header flags are written.
    #[must_use]
    pub const fn flags_enabled(&self) -> bool {
        self.flags_enabled
    }

    /// Encodes one event. See [`encode`].
    ///
    /// # Errors
    ///
    /// Same as [`encode`].
    pub fn encode(
        &self,
        identity: &EventIdentity,
        fragments: &FragmentCollection,
    ) -> CodecResult<Record> {
        encode(self.version, identity, self.flags_enabled, fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{adler32, crc32c};

    fn word(bytes: &[u8], index: usize) -> u32 {
        let start = index * 4;
        u32::from_le_bytes([
            bytes[start],
            bytes[start + 1],
            bytes[start + 2],
            bytes[start + 3],
        ])
    }

    fn version(v: u32) -> FormatVersion {
        FormatVersion::new(v).unwrap()
    }

    fn single_fragment() -> FragmentCollection {
        FragmentCollection::new()
            .with(0, vec![1, 2, 3, 4, 5, 6, 7, 8])
            .unwrap()
    }

    #[test]
    fn v5_layout() {
        let id = EventIdentity::new(7, 3, 42);
        let record = encode(version(5), &id, true, &single_fragment()).unwrap();
        let bytes = record.as_bytes();

        assert_eq!(record.total_size(), 24 + 8);
        assert_eq!(word(bytes, 0), 5);
        assert_eq!(word(bytes, 1), 7);
        assert_eq!(word(bytes, 2), 3);
        assert_eq!(word(bytes, 3), 42);
        assert_eq!(word(bytes, 4), 8);
        assert_eq!(word(bytes, 5), crc32c(&[1, 2, 3, 4, 5, 6, 7, 8]));
        assert_eq!(&bytes[24..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn v3_layout_uses_adler_and_reserved_word() {
        let id = EventIdentity::new(1, 1, 1);
        let record = encode(version(3), &id, true, &single_fragment()).unwrap();
        let bytes = record.as_bytes();

        assert_eq!(record.total_size(), 28 + 8);
        assert_eq!(word(bytes, 4), 8);
        assert_eq!(word(bytes, 5), adler32(&[1, 2, 3, 4, 5, 6, 7, 8]));
        assert_eq!(word(bytes, 6), 0);
    }

    #[test]
    fn v4_layout_has_event_high_word() {
        let mut id = EventIdentity::new(1, 2, 3);
        id.event_high = 99;
        let record = encode(version(4), &id, true, &single_fragment()).unwrap();
        let bytes = record.as_bytes();

        assert_eq!(record.total_size(), 32 + 8);
        assert_eq!(word(bytes, 3), 3);
        assert_eq!(word(bytes, 4), 0);
        assert_eq!(word(bytes, 5), 8);
        assert_eq!(word(bytes, 6), adler32(&[1, 2, 3, 4, 5, 6, 7, 8]));
        assert_eq!(word(bytes, 7), 0);
    }

    #[test]
    fn v6_flags() {
        let real = EventIdentity::new(1, 1, 1);
        let sim = real.with_real_data(false);

        let record = encode(version(6), &real, true, &single_fragment()).unwrap();
        assert_eq!(word(record.as_bytes(), 0), 6 | (0x0003 << 16));

        let record = encode(version(6), &sim, true, &single_fragment()).unwrap();
        assert_eq!(word(record.as_bytes(), 0), 6 | (0x0002 << 16));

        let record = encode(version(6), &real, false, &single_fragment()).unwrap();
        assert_eq!(word(record.as_bytes(), 0), 6);
    }

    #[test]
    fn flags_ignored_below_v6() {
        let record = encode(version(5), &EventIdentity::new(1, 1, 1), true, &single_fragment())
            .unwrap();
        assert_eq!(word(record.as_bytes(), 0), 5);
    }

    #[test]
    fn empty_event_is_header_only() {
        let id = EventIdentity::new(1, 1, 1);
        let empty = FragmentCollection::new();

        let record = encode(version(5), &id, true, &empty).unwrap();
        assert_eq!(record.total_size(), 24);
        assert_eq!(word(record.as_bytes(), 4), 0);
        assert_eq!(word(record.as_bytes(), 5), 0);

        let record = encode(version(3), &id, true, &empty).unwrap();
        assert_eq!(record.total_size(), 28);
        assert_eq!(word(record.as_bytes(), 5), 1);
    }

    #[test]
    fn legacy_size_table_and_compaction() {
        let fragments = FragmentCollection::new()
            .with(0, vec![0xA; 8])
            .unwrap()
            .with(5, vec![0xB; 16])
            .unwrap()
            .with(1023, vec![0xC; 4])
            .unwrap();
        let record = encode(version(2), &EventIdentity::new(1, 1, 1), true, &fragments).unwrap();
        let bytes = record.as_bytes();

        assert_eq!(record.total_size(), 4112 + 28);
        for id in 0..1024 {
            let expected = match id {
                0 => 8,
                5 => 16,
                1023 => 4,
                _ => 0,
            };
            assert_eq!(word(bytes, 4 + id), expected, "size table entry {id}");
        }

        let payload = &bytes[4112..];
        assert_eq!(&payload[..8], &[0xA; 8]);
        assert_eq!(&payload[8..24], &[0xB; 16]);
        assert_eq!(&payload[24..], &[0xC; 4]);
    }

    #[test]
    fn legacy_ignores_sources_past_table() {
        let fragments = FragmentCollection::new()
            .with(3, vec![1; 8])
            .unwrap()
            .with(1024, vec![2; 8])
            .unwrap();
        let record = encode(version(1), &EventIdentity::new(1, 1, 1), true, &fragments).unwrap();
        assert_eq!(record.total_size(), 4112 + 8);

        let record = encode(version(5), &EventIdentity::new(1, 1, 1), true, &fragments).unwrap();
        assert_eq!(record.total_size(), 24 + 16);
    }

    #[test]
    fn encoder_binds_version() {
        let encoder = RecordEncoder::new(version(6), false);
        let record = encoder
            .encode(&EventIdentity::new(1, 1, 1), &single_fragment())
            .unwrap();
        assert_eq!(record.version(), version(6));
        assert_eq!(record.payload_size(), 8);
        assert!(!encoder.flags_enabled());
    }
}
