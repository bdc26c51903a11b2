//! Payload checksums.
//!
//! Two algorithms are in use across the record format versions:
//!
//! - **Adler-32** for versions 3 and 4
//! - **CRC-32C** (Castagnoli) for versions 5 and later
//!
//! Both must match their reference outputs bit for bit; readers recompute
//! them over the payload region and compare against the header word.

/// Largest prime smaller than 2^16.
const ADLER_MOD: u32 = 65_521;

/// Largest n such that 255n(n+1)/2 + (n+1)(ADLER_MOD-1) fits in a u32.
/// Reductions can be deferred for this many bytes.
const ADLER_NMAX: usize = 5552;

/// Checksum algorithm stored in a record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumKind {
    /// Castagnoli CRC-32.
    Crc32c,
    /// Adler-32 with `a = 1`, `b = 0` seeds.
    Adler32,
}

impl ChecksumKind {
    /// Computes this checksum over `data`.
    #[must_use]
    pub fn compute(self, data: &[u8]) -> u32 {
        compute(self, data)
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Crc32c => "crc32c",
            Self::Adler32 => "adler32",
        }
    }
}

/// Computes the checksum of the given kind over `data`.
#[must_use]
pub fn compute(kind: ChecksumKind, data: &[u8]) -> u32 {
    match kind {
        ChecksumKind::Crc32c => crc32c(data),
        ChecksumKind::Adler32 => adler32(data),
    }
}

/// Computes CRC-32C over `data`, starting from a zero CRC.
#[must_use]
pub fn crc32c(data: &[u8]) -> u32 {
    crc32c::crc32c_append(0, data)
}

/// Computes Adler-32 over `data`.
///
/// Returns `(b << 16) | a` where `a` starts at 1 and `b` at 0.
#[must_use]
pub fn adler32(data: &[u8]) -> u32 {
    adler32_update(1, 0, data)
}

/// Continues an Adler-32 computation from the running sums `a` and `b`.
#[must_use]
pub fn adler32_update(mut a: u32, mut b: u32, data: &[u8]) -> u32 {
    for chunk in data.chunks(ADLER_NMAX) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= ADLER_MOD;
        b %= ADLER_MOD;
    }
    (b << 16) | a
}
