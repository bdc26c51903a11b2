//! Record decoder and streaming record iterator.

use crate::error::{CodecError, CodecResult};
use crate::fed;
use crate::fragment::{EventIdentity, FragmentCollection};
use crate::version::{
    FormatVersion, Layout, FLAG_FROM_OUTPUT_MODULE, FLAG_IS_REAL_DATA, LEGACY_SOURCE_COUNT,
    WORD_SIZE,
};

/// A record decoded from a byte slice.
///
/// The payload is borrowed from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord<'a> {
    /// Format version from word 0.
    pub version: FormatVersion,
    /// Header flags, for layouts that carry them.
    pub flags: Option<u16>,
    /// Event identity. `is_real_data` is taken from the flags when they
    /// were written and defaults to `true` otherwise.
    pub identity: EventIdentity,
    /// Per-source sizes for legacy layouts.
    pub size_table: Option<Vec<u32>>,
    /// Stored checksum, for layouts that carry one.
    pub checksum: Option<u32>,
    /// Payload bytes.
    pub payload: &'a [u8],
}

impl DecodedRecord<'_> {
    /// Total encoded size in bytes.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.version.header_size() + self.payload.len()
    }

    /// Reconstructs the fragment collection.
    ///
    /// Legacy records are split using the size table. Newer records only
    /// store the aggregate size, so the payload is split along FED trailers
    /// (see [`crate::fed`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be split.
    pub fn fragments(&self) -> CodecResult<FragmentCollection> {
        let Some(sizes) = &self.size_table else {
            return fed::split(self.payload);
        };

        let mut fragments = FragmentCollection::new();
        let mut offset = 0usize;
        for (id, &size) in sizes.iter().enumerate() {
            if size == 0 {
                continue;
            }
            let end = offset + size as usize;
            fragments.insert(id as u32, self.payload[offset..end].to_vec())?;
            offset = end;
        }
        Ok(fragments)
    }
}

/// Returns the total length of the record at the start of `data`.
///
/// # Errors
///
/// Returns [`CodecError::Truncated`] if the header is incomplete, or an
/// error if the version word is not recognised.
pub fn record_len(data: &[u8]) -> CodecResult<usize> {
    let version = read_version(data)?;
    let layout = version.layout();
    let header_size = layout.header_size();
    if data.len() < header_size {
        return Err(CodecError::truncated(header_size, data.len()));
    }

    let payload_len = match layout.payload_size_offset() {
        Some(offset) => read_u32(data, offset) as usize,
        None => (0..LEGACY_SOURCE_COUNT)
            .map(|id| read_u32(data, (4 + id) * WORD_SIZE) as usize)
            .sum(),
    };
    Ok(header_size + payload_len)
}

/// Decodes the record at the start of `data` and verifies its checksum.
///
/// Bytes past the end of the record are ignored.
///
/// # Errors
///
/// Returns an error if the record is truncated, has an unknown version, or
/// its checksum does not match.
pub fn decode(data: &[u8]) -> CodecResult<DecodedRecord<'_>> {
    let total = record_len(data)?;
    if data.len() < total {
        return Err(CodecError::truncated(total, data.len()));
    }

    let word0 = read_u32(data, 0);
    let version = read_version(data)?;
    let layout = version.layout();
    let header_size = layout.header_size();
    let payload = &data[header_size..total];

    let flags = layout.has_flags().then(|| (word0 >> 16) as u16);
    let mut identity = EventIdentity::new(read_u32(data, 4), read_u32(data, 8), read_u32(data, 12));
    // A cleared flags field means flags were not written.
    if let Some(flags) = flags.filter(|f| f & FLAG_FROM_OUTPUT_MODULE != 0) {
        identity.is_real_data = flags & FLAG_IS_REAL_DATA != 0;
    }
    if layout.has_event_high() {
        identity.event_high = read_u32(data, 16);
    }

    let size_table = (layout == Layout::SizeTable).then(|| {
        (0..LEGACY_SOURCE_COUNT)
            .map(|id| read_u32(data, (4 + id) * WORD_SIZE))
            .collect::<Vec<_>>()
    });

    let checksum = match (layout.checksum(), layout.checksum_offset()) {
        (Some(kind), Some(offset)) => {
            let stored = read_u32(data, offset);
            let actual = kind.compute(payload);
            if stored != actual {
                return Err(CodecError::ChecksumMismatch {
                    expected: stored,
                    actual,
                });
            }
            Some(stored)
        }
        _ => None,
    };

    Ok(DecodedRecord {
        version,
        flags,
        identity,
        size_table,
        checksum,
        payload,
    })
}

fn read_version(data: &[u8]) -> CodecResult<FormatVersion> {
    if data.len() < WORD_SIZE {
        return Err(CodecError::truncated(WORD_SIZE, data.len()));
    }
    let word0 = read_u32(data, 0);
    let version = FormatVersion::new(word0 & 0xFFFF)?;
    if !version.layout().has_flags() && word0 >> 16 != 0 {
        return Err(CodecError::invalid_structure(format!(
            "unexpected flags {:04x} for {version}",
            word0 >> 16
        )));
    }
    Ok(version)
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Iterator over records concatenated in a byte slice.
///
/// Yields `(offset, record)` pairs. The first error ends the iteration.
///
/// # Example
///
/// ```
/// use rawout_codec::{encode, EventIdentity, FormatVersion, FragmentCollection, RecordIterator};
///
/// let version = FormatVersion::new(5).unwrap();
/// let fragments = FragmentCollection::new();
/// let mut file = Vec::new();
/// for event in 1..=3 {
///     let id = EventIdentity::new(1, 1, event);
///     file.extend_from_slice(encode(version, &id, true, &fragments).unwrap().as_bytes());
/// }
///
/// let events: Vec<u32> = RecordIterator::new(&file)
///     .map(|r| r.unwrap().1.identity.event)
///     .collect();
/// assert_eq!(events, vec![1, 2, 3]);
/// ```
#[derive(Debug)]
pub struct RecordIterator<'a> {
    data: &'a [u8],
    offset: usize,
    finished: bool,
}

impl<'a> RecordIterator<'a> {
    /// Creates an iterator starting at the beginning of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            finished: false,
        }
    }

    /// Offset of the next record.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for RecordIterator<'a> {
    type Item = CodecResult<(usize, DecodedRecord<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.offset >= self.data.len() {
            return None;
        }

        let offset = self.offset;
        match decode(&self.data[offset..]) {
            Ok(record) => {
                self.offset += record.total_size();
                Some(Ok((offset, record)))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use proptest::prelude::*;

    fn version(v: u32) -> FormatVersion {
        FormatVersion::new(v).unwrap()
    }

    fn framed_event(sources: &[(u32, usize)]) -> FragmentCollection {
        let mut fragments = FragmentCollection::new();
        for &(id, body) in sources {
            let data = fed::frame(id, 1, &vec![id as u8; body]).unwrap();
            fragments.insert(id, data).unwrap();
        }
        fragments
    }

    #[test]
    fn decode_legacy_recovers_fragments() {
        let fragments = FragmentCollection::new()
            .with(0, vec![1; 8])
            .unwrap()
            .with(5, vec![2; 12])
            .unwrap()
            .with(1023, vec![3; 4])
            .unwrap();
        let id = EventIdentity::new(10, 20, 30);
        let record = encode(version(1), &id, true, &fragments).unwrap();

        let decoded = decode(record.as_bytes()).unwrap();
        assert_eq!(decoded.identity, id);
        assert_eq!(decoded.checksum, None);
        assert_eq!(decoded.fragments().unwrap(), fragments);
    }

    #[test]
    fn decode_v6_reads_flags() {
        let id = EventIdentity::new(1, 2, 3).with_real_data(false);
        let record = encode(version(6), &id, true, &FragmentCollection::new()).unwrap();
        let decoded = decode(record.as_bytes()).unwrap();
        assert_eq!(decoded.flags, Some(0x0002));
        assert_eq!(decoded.identity, id);
    }

    #[test]
    fn decode_v6_without_flags_keeps_identity() {
        let id = EventIdentity::new(1, 1, 1);
        let record = encode(version(6), &id, false, &FragmentCollection::new()).unwrap();
        let decoded = decode(record.as_bytes()).unwrap();
        assert_eq!(decoded.flags, Some(0));
        assert_eq!(decoded.identity, id);
    }

    #[test]
    fn decode_detects_corruption() {
        let fragments = framed_event(&[(1, 16), (2, 8)]);
        for v in 3..=6 {
            let record = encode(version(v), &EventIdentity::new(1, 1, 1), true, &fragments)
                .unwrap();
            let mut bytes = record.into_bytes();
            let last = bytes.len() - 9;
            bytes[last] ^= 0xFF;
            assert!(
                matches!(decode(&bytes), Err(CodecError::ChecksumMismatch { .. })),
                "version {v}"
            );
        }
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let record = encode(
            version(5),
            &EventIdentity::new(1, 1, 1),
            true,
            &framed_event(&[(1, 8)]),
        )
        .unwrap();
        let bytes = record.as_bytes();
        assert!(matches!(
            decode(&bytes[..bytes.len() - 1]),
            Err(CodecError::Truncated { .. })
        ));
        assert!(matches!(decode(&bytes[..2]), Err(CodecError::Truncated { .. })));
    }

    #[test]
    fn decode_rejects_unknown_version() {
        let mut bytes = vec![0u8; 24];
        bytes[0] = 9;
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::UnsupportedVersion { version: 9 })
        ));
    }

    #[test]
    fn iterator_walks_mixed_versions() {
        let fragments = framed_event(&[(7, 24)]);
        let mut file = Vec::new();
        for (event, v) in [(1, 1), (2, 3), (3, 4), (4, 5), (5, 6)] {
            let id = EventIdentity::new(1, 1, event);
            let record = encode(version(v), &id, true, &fragments).unwrap();
            file.extend_from_slice(record.as_bytes());
        }

        let decoded: Vec<_> = RecordIterator::new(&file)
            .collect::<CodecResult<Vec<_>>>()
            .unwrap();
        assert_eq!(decoded.len(), 5);
        assert_eq!(decoded[0].0, 0);
        assert_eq!(decoded[1].0, 4112 + 40);
        for (i, (_, record)) in decoded.iter().enumerate() {
            assert_eq!(record.identity.event, i as u32 + 1);
            assert_eq!(record.fragments().unwrap(), fragments);
        }
    }

    #[test]
    fn iterator_stops_after_error() {
        let mut file = encode(
            version(5),
            &EventIdentity::new(1, 1, 1),
            true,
            &FragmentCollection::new(),
        )
        .unwrap()
        .into_bytes();
        file.extend_from_slice(&[0xFF; 10]);

        let mut iter = RecordIterator::new(&file);
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    fn source_strategy() -> impl Strategy<Value = Vec<(u32, usize)>> {
        prop::collection::btree_map(0u32..=4095, 0usize..64, 0..12)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn roundtrip_framed_fragments(
            sources in source_strategy(),
            v in 3u32..=6,
            run in any::<u32>(),
            lumi in any::<u32>(),
            event in any::<u32>(),
        ) {
            let fragments = framed_event(&sources);
            let id = EventIdentity::new(run, lumi, event);
            let record = encode(version(v), &id, true, &fragments).unwrap();

            let expected_size = version(v).header_size()
                + fragments.iter().map(|(_, d)| d.len()).sum::<usize>();
            prop_assert_eq!(record.total_size(), expected_size);

            let decoded = decode(record.as_bytes()).unwrap();
            prop_assert_eq!(decoded.identity.run, run);
            prop_assert_eq!(decoded.identity.lumi, lumi);
            prop_assert_eq!(decoded.identity.event, event);
            prop_assert_eq!(decoded.fragments().unwrap(), fragments);
        }

        #[test]
        fn roundtrip_legacy_fragments(
            sizes in prop::collection::btree_map(0u32..1024, 1usize..48, 0..16),
            v in 1u32..=2,
        ) {
            let mut fragments = FragmentCollection::new();
            for (&id, &len) in &sizes {
                fragments.insert(id, vec![(id % 251) as u8; len]).unwrap();
            }
            let id = EventIdentity::new(1, 2, 3);
            let record = encode(version(v), &id, true, &fragments).unwrap();
            prop_assert_eq!(record.total_size(), 4112 + sizes.values().sum::<usize>());

            let decoded = decode(record.as_bytes()).unwrap();
            prop_assert_eq!(decoded.identity, id);
            prop_assert_eq!(decoded.fragments().unwrap(), fragments);
        }
    }
}
