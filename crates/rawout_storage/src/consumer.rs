//! Output consumer trait definition.

use crate::error::{StorageError, StorageResult};
use std::path::Path;

/// A destination for encoded records.
///
/// Consumers are **opaque byte sinks**. They open destinations, accept
/// whole records and close destinations at boundaries; they never look
/// inside a record.
///
/// # Ordering
///
/// - `start` is called once before the first boundary
/// - `initialize` always precedes any `write_record` for the destination
///   it opened; each call opens a fresh destination
/// - `end_of_boundary` is called once per boundary
/// - `stop` is only called after the last `end_of_boundary`
///
/// # Shared mode
///
/// A consumer in shared mode does not write records itself. Records are
/// passed to [`hand_off`](Self::hand_off) instead, and an out-of-process
/// aggregator is responsible for persisting them. The mode is a runtime
/// property, queried once per session through
/// [`is_shared_mode`](Self::is_shared_mode).
pub trait OutputConsumer: Send {
    /// Called once when a run starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer cannot be started.
    fn start(&mut self) -> StorageResult<()>;

    /// Called once when the run ends.
    ///
    /// # Errors
    ///
    /// Returns an error if pending data cannot be flushed.
    fn stop(&mut self) -> StorageResult<()>;

    /// Opens a new destination `name` inside `destination_dir`.
    ///
    /// Any previously open destination is closed first. Destinations are
    /// never appended to across calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be created.
    fn initialize(&mut self, destination_dir: &Path, name: &str, lumi: u32) -> StorageResult<()>;

    /// Writes one complete record to the current destination.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotInitialized`] if no destination is open,
    /// or an I/O error.
    fn write_record(&mut self, record: &[u8]) -> StorageResult<()>;

    /// Transfers ownership of one record to the shared-mode channel.
    ///
    /// # Errors
    ///
    /// The default implementation returns
    /// [`StorageError::HandOffUnsupported`].
    fn hand_off(&mut self, record: Vec<u8>) -> StorageResult<()> {
        let _ = record;
        Err(StorageError::HandOffUnsupported)
    }

    /// Called when a luminosity block ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be flushed or closed.
    fn end_of_boundary(&mut self, lumi: u32) -> StorageResult<()>;

    /// Whether records go through [`hand_off`](Self::hand_off) rather than
    /// [`write_record`](Self::write_record).
    fn is_shared_mode(&self) -> bool {
        false
    }
}
