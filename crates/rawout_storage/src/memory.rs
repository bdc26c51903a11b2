//! In-memory output consumer for testing.

use crate::consumer::OutputConsumer;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A destination captured by [`InMemoryConsumer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDestination {
    /// Directory passed to `initialize`.
    pub dir: PathBuf,
    /// Name passed to `initialize`.
    pub name: String,
    /// Luminosity block passed to `initialize`.
    pub lumi: u32,
    /// Records written to this destination, in order.
    pub records: Vec<Vec<u8>>,
}

impl MemoryDestination {
    /// Concatenated bytes of all records, as a file would contain them.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.records.concat()
    }
}

/// A lifecycle call observed by [`InMemoryConsumer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumerEvent {
    /// `start` was called.
    Start,
    /// `initialize` was called with this name and lumi.
    Initialize {
        /// Destination name.
        name: String,
        /// Luminosity block.
        lumi: u32,
    },
    /// A record of this size was written.
    Write {
        /// Record size in bytes.
        len: usize,
    },
    /// `end_of_boundary` was called for this lumi.
    EndOfBoundary(u32),
    /// `stop` was called.
    Stop,
}

#[derive(Debug, Default)]
struct MemoryState {
    destinations: Vec<MemoryDestination>,
    events: Vec<ConsumerEvent>,
}

/// An output consumer that keeps every destination in memory.
///
/// Clones share the same state, so a test can keep one handle while the
/// session owns another.
///
/// # Example
///
/// ```rust
/// use rawout_storage::{InMemoryConsumer, OutputConsumer};
/// use std::path::Path;
///
/// let handle = InMemoryConsumer::new();
/// let mut consumer = handle.clone();
/// consumer.initialize(Path::new("run1"), "a.raw", 1).unwrap();
/// consumer.write_record(b"record").unwrap();
///
/// assert_eq!(handle.destinations()[0].contents(), b"record");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryConsumer {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryConsumer {
    /// Creates an empty consumer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all destinations opened so far.
    #[must_use]
    pub fn destinations(&self) -> Vec<MemoryDestination> {
        self.state.read().destinations.clone()
    }

    /// Snapshot of all lifecycle calls observed so far.
    #[must_use]
    pub fn events(&self) -> Vec<ConsumerEvent> {
        self.state.read().events.clone()
    }

    /// Total number of records written across destinations.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.state
            .read()
            .destinations
            .iter()
            .map(|d| d.records.len())
            .sum()
    }
}

impl OutputConsumer for InMemoryConsumer {
    fn start(&mut self) -> StorageResult<()> {
        self.state.write().events.push(ConsumerEvent::Start);
        Ok(())
    }

    fn stop(&mut self) -> StorageResult<()> {
        self.state.write().events.push(ConsumerEvent::Stop);
        Ok(())
    }

    fn initialize(&mut self, destination_dir: &Path, name: &str, lumi: u32) -> StorageResult<()> {
        let mut state = self.state.write();
        state.events.push(ConsumerEvent::Initialize {
            name: name.to_string(),
            lumi,
        });
        state.destinations.push(MemoryDestination {
            dir: destination_dir.to_path_buf(),
            name: name.to_string(),
            lumi,
            records: Vec::new(),
        });
        Ok(())
    }

    fn write_record(&mut self, record: &[u8]) -> StorageResult<()> {
        let mut state = self.state.write();
        let destination = state
            .destinations
            .last_mut()
            .ok_or(StorageError::NotInitialized)?;
        destination.records.push(record.to_vec());
        state.events.push(ConsumerEvent::Write { len: record.len() });
        Ok(())
    }

    fn end_of_boundary(&mut self, lumi: u32) -> StorageResult<()> {
        self.state
            .write()
            .events
            .push(ConsumerEvent::EndOfBoundary(lumi));
        Ok(())
    }
}
