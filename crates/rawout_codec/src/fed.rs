//! FED fragment framing.
//!
//! Each detector fragment is wrapped in a 64-bit header and a 64-bit
//! trailer, both stored as pairs of little-endian 32-bit words:
//!
//! ```text
//! header : | bx(12) source(12) version(4) more(1) - (3) | 0x5(4) evt_ty(4) lvl1(24) |
//! body   : | ... multiple of 8 bytes ...                                       |
//! trailer: | crc(16) - (4) status(4) tts(4) - (4)     | 0xA(4) - (4) length(24) |
//! ```
//!
//! The trailer length counts 64-bit words including header and trailer.
//! Records of version 3 and later only store the aggregate payload size,
//! so readers recover the individual fragments by walking trailers
//! backwards from the end of the payload.

use crate::error::{CodecError, CodecResult};
use crate::fragment::FragmentCollection;

/// Size of the FED header in bytes.
pub const FED_HEADER_SIZE: usize = 8;

/// Size of the FED trailer in bytes.
pub const FED_TRAILER_SIZE: usize = 8;

/// Beginning-of-event marker in the top nibble of the header event word.
const BOE_MARKER: u32 = 0x5;

/// End-of-event marker in the top nibble of the trailer size word.
const EOE_MARKER: u32 = 0xA;

/// Largest source id representable in the 12-bit header field.
pub const MAX_FRAMED_SOURCE_ID: u32 = 0xFFF;

/// Builds a framed fragment for `source_id` around `body`.
///
/// `body` is zero-padded to a multiple of 8 bytes.
///
/// # Errors
///
/// Returns an error if `source_id` does not fit the 12-bit header field or
/// the fragment is too long for the 24-bit trailer length.
pub fn frame(source_id: u32, lvl1_id: u32, body: &[u8]) -> CodecResult<Vec<u8>> {
    if source_id > MAX_FRAMED_SOURCE_ID {
        return Err(CodecError::InvalidSourceId {
            source_id,
            max: MAX_FRAMED_SOURCE_ID,
        });
    }
    let padded_body = body.len().div_ceil(8) * 8;
    let total = FED_HEADER_SIZE + padded_body + FED_TRAILER_SIZE;
    let words = total / 8;
    if words > 0x00FF_FFFF {
        return Err(CodecError::size_overflow(format!(
            "fragment of {total} bytes exceeds the trailer length field"
        )));
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&((source_id & 0xFFF) << 8).to_le_bytes());
    out.extend_from_slice(&((BOE_MARKER << 28) | (lvl1_id & 0x00FF_FFFF)).to_le_bytes());
    out.extend_from_slice(body);
    out.resize(FED_HEADER_SIZE + padded_body, 0);
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&((EOE_MARKER << 28) | words as u32).to_le_bytes());
    Ok(out)
}

/// Reads the source id from a framed fragment header.
///
/// # Errors
///
/// Returns an error if the fragment is shorter than a header or the
/// beginning-of-event marker is missing.
pub fn source_id(fragment: &[u8]) -> CodecResult<u32> {
    if fragment.len() < FED_HEADER_SIZE {
        return Err(CodecError::truncated(FED_HEADER_SIZE, fragment.len()));
    }
    let source_word = read_u32(fragment, 0);
    let event_word = read_u32(fragment, 4);
    if event_word >> 28 != BOE_MARKER {
        return Err(CodecError::invalid_structure(format!(
            "missing FED header marker: {event_word:08x}"
        )));
    }
    Ok((source_word >> 8) & 0xFFF)
}

/// Splits a payload of concatenated framed fragments.
///
/// Fragments are located from the end of the payload using their trailer
/// lengths and returned keyed by the source id in their header.
///
/// # Errors
///
/// Returns an error if a trailer or header is malformed or a trailer length
/// runs past the start of the payload.
pub fn split(payload: &[u8]) -> CodecResult<FragmentCollection> {
    let mut fragments = FragmentCollection::new();
    let mut end = payload.len();

    while end > 0 {
        if end < FED_HEADER_SIZE + FED_TRAILER_SIZE {
            return Err(CodecError::invalid_structure(format!(
                "{end} trailing bytes cannot hold a FED fragment"
            )));
        }
        let size_word = read_u32(payload, end - 4);
        if size_word >> 28 != EOE_MARKER {
            return Err(CodecError::invalid_structure(format!(
                "missing FED trailer marker at offset {}: {size_word:08x}",
                end - 4
            )));
        }
        let len = (size_word & 0x00FF_FFFF) as usize * 8;
        if len < FED_HEADER_SIZE + FED_TRAILER_SIZE || len > end {
            return Err(CodecError::invalid_structure(format!(
                "FED trailer length {len} invalid at offset {}",
                end - 4
            )));
        }
        let start = end - len;
        let fragment = &payload[start..end];
        let id = source_id(fragment)?;
        if !fragments.get(id).is_empty() {
            return Err(CodecError::invalid_structure(format!(
                "duplicate fragment for source {id}"
            )));
        }
        fragments.insert(id, fragment.to_vec())?;
        end = start;
    }

    Ok(fragments)
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_layout() {
        let fragment = frame(812, 7, &[1, 2, 3]).unwrap();
        assert_eq!(fragment.len(), 24);
        assert_eq!(source_id(&fragment).unwrap(), 812);
        assert_eq!(&fragment[8..11], &[1, 2, 3]);
        assert_eq!(&fragment[11..16], &[0; 5]);
        assert_eq!(fragment[23] >> 4, 0xA);
        assert_eq!(fragment[20], 3);
    }

    #[test]
    fn frame_rejects_wide_source() {
        assert!(frame(4096, 0, &[]).is_err());
    }

    #[test]
    fn split_recovers_fragments() {
        let a = frame(3, 1, &[0xAA; 16]).unwrap();
        let b = frame(700, 1, &[0xBB; 8]).unwrap();
        let c = frame(1500, 1, &[]).unwrap();
        let payload = [a.clone(), b.clone(), c.clone()].concat();

        let fragments = split(&payload).unwrap();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments.get(3), a.as_slice());
        assert_eq!(fragments.get(700), b.as_slice());
        assert_eq!(fragments.get(1500), c.as_slice());
    }

    #[test]
    fn split_empty_payload() {
        assert!(split(&[]).unwrap().is_empty());
    }

    #[test]
    fn split_rejects_garbage() {
        assert!(split(&[0u8; 16]).is_err());
        let mut fragment = frame(1, 1, &[0; 8]).unwrap();
        fragment[4..8].copy_from_slice(&0u32.to_le_bytes());
        assert!(split(&fragment).is_err());
    }

    #[test]
    fn split_rejects_duplicate_sources() {
        let a = frame(9, 1, &[1; 8]).unwrap();
        let payload = [a.clone(), a].concat();
        assert!(split(&payload).is_err());
    }
}
