//! Bounds-checked write cursor over a fixed-size record buffer.

use crate::error::{CodecError, CodecResult};

/// Sequential little-endian writer over a pre-sized buffer.
///
/// The buffer is allocated once at its final size. Every write is checked
/// against that size, so a miscomputed header or payload length surfaces
/// as [`CodecError::BufferOverrun`] instead of a silently short record.
#[derive(Debug)]
pub struct WordCursor {
    buffer: Vec<u8>,
    pos: usize,
}

impl WordCursor {
    /// Creates a cursor over a zeroed buffer of exactly `size` bytes.
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            buffer: vec![0u8; size],
            pos: 0,
        }
    }

    /// Current write offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Writes a little-endian u32 and advances.
    pub fn put_u32(&mut self, value: u32) -> CodecResult<()> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Copies `data` and advances.
    pub fn put_bytes(&mut self, data: &[u8]) -> CodecResult<()> {
        let end = self.check(self.pos, data.len())?;
        self.buffer[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }

    /// Overwrites a u32 at an absolute offset already written.
    pub fn patch_u32(&mut self, offset: usize, value: u32) -> CodecResult<()> {
        let end = self.check(offset, 4)?;
        if end > self.pos {
            return Err(CodecError::BufferOverrun {
                offset,
                len: 4,
                capacity: self.pos,
            });
        }
        self.buffer[offset..end].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Bytes written from `offset` up to the current position.
    #[must_use]
    pub fn written_from(&self, offset: usize) -> &[u8] {
        &self.buffer[offset.min(self.pos)..self.pos]
    }

    /// Consumes the cursor, returning the buffer if it was filled exactly.
    pub fn finish(self) -> CodecResult<Vec<u8>> {
        if self.pos != self.buffer.len() {
            return Err(CodecError::SizeMismatch {
                expected: self.buffer.len(),
                actual: self.pos,
            });
        }
        Ok(self.buffer)
    }

    fn check(&self, offset: usize, len: usize) -> CodecResult<usize> {
        offset
            .checked_add(len)
            .filter(|&end| end <= self.buffer.len())
            .ok_or(CodecError::BufferOverrun {
                offset,
                len,
                capacity: self.buffer.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_little_endian_words() {
        let mut cursor = WordCursor::with_size(8);
        cursor.put_u32(1).unwrap();
        cursor.put_u32(0xAABB_CCDD).unwrap();
        assert_eq!(
            cursor.finish().unwrap(),
            vec![1, 0, 0, 0, 0xDD, 0xCC, 0xBB, 0xAA]
        );
    }

    #[test]
    fn overrun_is_rejected() {
        let mut cursor = WordCursor::with_size(6);
        cursor.put_u32(1).unwrap();
        let err = cursor.put_u32(2).unwrap_err();
        assert_eq!(
            err,
            CodecError::BufferOverrun {
                offset: 4,
                len: 4,
                capacity: 6
            }
        );
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn short_fill_is_a_size_mismatch() {
        let mut cursor = WordCursor::with_size(8);
        cursor.put_u32(1).unwrap();
        assert_eq!(
            cursor.finish().unwrap_err(),
            CodecError::SizeMismatch {
                expected: 8,
                actual: 4
            }
        );
    }

    #[test]
    fn patch_only_inside_written_region() {
        let mut cursor = WordCursor::with_size(8);
        cursor.put_u32(0).unwrap();
        cursor.patch_u32(0, 7).unwrap();
        assert!(cursor.patch_u32(4, 7).is_err());
        cursor.put_u32(0).unwrap();
        assert_eq!(cursor.written_from(0)[0], 7);
    }
}
