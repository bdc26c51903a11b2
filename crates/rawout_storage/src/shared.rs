//! Shared-mode output consumer.
//!
//! In shared mode the writer does not persist records itself. Every record
//! is handed to a queue that an aggregator drains and writes out on the
//! writer's behalf.

use crate::consumer::OutputConsumer;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A record handed off in shared mode, tagged with its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedRecord {
    /// Destination directory at hand-off time.
    pub dir: PathBuf,
    /// Destination name at hand-off time.
    pub name: String,
    /// Luminosity block of the destination.
    pub lumi: u32,
    /// Encoded record.
    pub bytes: Vec<u8>,
}

/// Aggregator side of the shared-mode channel.
#[derive(Debug, Clone, Default)]
pub struct SharedQueue {
    inner: Arc<Mutex<VecDeque<SharedRecord>>>,
}

impl SharedQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued record, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<SharedRecord> {
        self.inner.lock().drain(..).collect()
    }

    /// Number of queued records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    fn push(&self, record: SharedRecord) {
        self.inner.lock().push_back(record);
    }
}

/// Output consumer that hands records to a [`SharedQueue`].
#[derive(Debug)]
pub struct SharedBufferConsumer {
    queue: SharedQueue,
    destination: Option<(PathBuf, String, u32)>,
}

impl SharedBufferConsumer {
    /// Creates a consumer feeding `queue`.
    #[must_use]
    pub fn new(queue: SharedQueue) -> Self {
        Self {
            queue,
            destination: None,
        }
    }

    /// The queue this consumer feeds.
    #[must_use]
    pub fn queue(&self) -> &SharedQueue {
        &self.queue
    }
}

impl OutputConsumer for SharedBufferConsumer {
    fn start(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn stop(&mut self) -> StorageResult<()> {
        self.destination = None;
        Ok(())
    }

    fn initialize(&mut self, destination_dir: &Path, name: &str, lumi: u32) -> StorageResult<()> {
        self.destination = Some((destination_dir.to_path_buf(), name.to_string(), lumi));
        Ok(())
    }

    fn write_record(&mut self, _record: &[u8]) -> StorageResult<()> {
        Err(StorageError::SharedMode)
    }

    fn hand_off(&mut self, record: Vec<u8>) -> StorageResult<()> {
        let (dir, name, lumi) = self
            .destination
            .clone()
            .ok_or(StorageError::NotInitialized)?;
        self.queue.push(SharedRecord {
            dir,
            name,
            lumi,
            bytes: record,
        });
        Ok(())
    }

    fn end_of_boundary(&mut self, _lumi: u32) -> StorageResult<()> {
        self.destination = None;
        Ok(())
    }

    fn is_shared_mode(&self) -> bool {
        true
    }
}
