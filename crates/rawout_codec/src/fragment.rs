//! Event identity and per-event fragment collections.

use crate::error::{CodecError, CodecResult};
use crate::version::MAX_SOURCE_ID;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;

/// Identity metadata written into every record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventIdentity {
    /// Run number.
    pub run: u32,
    /// Luminosity block number.
    pub lumi: u32,
    /// Event number (low 32 bits).
    pub event: u32,
    /// High part of a 64-bit event number. Reserved; version 4 writes zero.
    pub event_high: u32,
    /// Whether the event is real detector data.
    pub is_real_data: bool,
}

impl EventIdentity {
    /// Creates an identity for real data with no high event part.
    #[must_use]
    pub const fn new(run: u32, lumi: u32, event: u32) -> Self {
        Self {
            run,
            lumi,
            event,
            event_high: 0,
            is_real_data: true,
        }
    }

    /// Sets the real-data flag.
    #[must_use]
    pub const fn with_real_data(mut self, is_real_data: bool) -> Self {
        self.is_real_data = is_real_data;
        self
    }
}

impl fmt::Display for EventIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.run, self.lumi, self.event)
    }
}

/// Raw fragments of one event, keyed by source id.
///
/// Ids without an entry, and entries with an empty buffer, both mean
/// "no fragment from this source". Iteration is always in increasing id
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentCollection {
    fragments: BTreeMap<u32, Bytes>,
}

impl FragmentCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the fragment for `source_id`, replacing any previous one.
    ///
    /// Empty buffers are accepted and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidSourceId`] if `source_id` exceeds
    /// [`MAX_SOURCE_ID`].
    pub fn insert(&mut self, source_id: u32, data: impl Into<Bytes>) -> CodecResult<()> {
        if source_id > MAX_SOURCE_ID {
            return Err(CodecError::InvalidSourceId {
                source_id,
                max: MAX_SOURCE_ID,
            });
        }
        let data = data.into();
        if data.is_empty() {
            self.fragments.remove(&source_id);
        } else {
            self.fragments.insert(source_id, data);
        }
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn with(mut self, source_id: u32, data: impl Into<Bytes>) -> CodecResult<Self> {
        self.insert(source_id, data)?;
        Ok(self)
    }

    /// Returns the fragment for `source_id`, empty if absent.
    #[must_use]
    pub fn get(&self, source_id: u32) -> &[u8] {
        self.fragments.get(&source_id).map_or(&[][..], |b| &b[..])
    }

    /// Number of non-empty fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns `true` if no source reported data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Iterates non-empty fragments in increasing source id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> + '_ {
        self.fragments.iter().map(|(&id, data)| (id, &data[..]))
    }

    /// Iterates non-empty fragments with ids below `source_count`.
    pub fn iter_below(&self, source_count: usize) -> impl Iterator<Item = (u32, &[u8])> + '_ {
        let end = u32::try_from(source_count).unwrap_or(u32::MAX);
        self.fragments
            .range(..end)
            .map(|(&id, data)| (id, &data[..]))
    }

    /// Total bytes of fragments with ids below `source_count`.
    #[must_use]
    pub fn payload_len(&self, source_count: usize) -> usize {
        self.iter_below(source_count).map(|(_, data)| data.len()).sum()
    }
}
