//! File-based output consumer.

use crate::consumer::OutputConsumer;
use crate::error::{StorageError, StorageResult};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// An open destination file.
#[derive(Debug)]
struct OpenFile {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes_written: u64,
}

impl OpenFile {
    fn close(mut self) -> StorageResult<ClosedFile> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(ClosedFile {
            path: self.path,
            bytes_written: self.bytes_written,
        })
    }
}

/// Summary of a destination that has been closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedFile {
    /// Path of the file.
    pub path: PathBuf,
    /// Bytes written to it.
    pub bytes_written: u64,
}

/// Writes records directly to files on the local file system.
///
/// # Durability
///
/// - records are buffered in memory between calls
/// - a destination is flushed and `sync_all`ed when it is closed, which
///   happens on the next `initialize`, at `end_of_boundary` and at `stop`
///
/// # Example
///
/// ```no_run
/// use rawout_storage::{FileConsumer, OutputConsumer};
/// use std::path::Path;
///
/// let mut consumer = FileConsumer::new();
/// consumer.start().unwrap();
/// consumer.initialize(Path::new("run000001"), "run000001_ls0001_index000000.raw", 1).unwrap();
/// consumer.write_record(&[5, 0, 0, 0]).unwrap();
/// consumer.end_of_boundary(1).unwrap();
/// consumer.stop().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct FileConsumer {
    current: Option<OpenFile>,
    closed: Vec<ClosedFile>,
    stopped: bool,
}

impl FileConsumer {
    /// Creates a consumer with no open destination.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the currently open destination.
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|f| f.path.as_path())
    }

    /// Destinations closed so far, oldest first.
    #[must_use]
    pub fn closed_files(&self) -> &[ClosedFile] {
        &self.closed
    }

    fn close_current(&mut self) -> StorageResult<()> {
        if let Some(file) = self.current.take() {
            self.closed.push(file.close()?);
        }
        Ok(())
    }
}

impl OutputConsumer for FileConsumer {
    fn start(&mut self) -> StorageResult<()> {
        self.stopped = false;
        Ok(())
    }

    fn stop(&mut self) -> StorageResult<()> {
        self.close_current()?;
        self.stopped = true;
        Ok(())
    }

    fn initialize(&mut self, destination_dir: &Path, name: &str, _lumi: u32) -> StorageResult<()> {
        if self.stopped {
            return Err(StorageError::Stopped);
        }
        self.close_current()?;

        fs::create_dir_all(destination_dir)?;
        let path = destination_dir.join(name);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        self.current = Some(OpenFile {
            path,
            writer: BufWriter::new(file),
            bytes_written: 0,
        });
        Ok(())
    }

    fn write_record(&mut self, record: &[u8]) -> StorageResult<()> {
        if self.stopped {
            return Err(StorageError::Stopped);
        }
        let file = self.current.as_mut().ok_or(StorageError::NotInitialized)?;
        file.writer.write_all(record)?;
        file.bytes_written += record.len() as u64;
        Ok(())
    }

    fn end_of_boundary(&mut self, _lumi: u32) -> StorageResult<()> {
        self.close_current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_write_before_initialize_fails() {
        let mut consumer = FileConsumer::new();
        consumer.start().unwrap();
        assert!(matches!(
            consumer.write_record(b"data"),
            Err(StorageError::NotInitialized)
        ));
    }

    #[test]
    fn file_records_are_appended_to_destination() {
        let dir = tempdir().unwrap();
        let mut consumer = FileConsumer::new();
        consumer.start().unwrap();
        consumer.initialize(dir.path(), "a.raw", 1).unwrap();
        consumer.write_record(b"hello").unwrap();
        consumer.write_record(b" world").unwrap();
        consumer.end_of_boundary(1).unwrap();

        assert_eq!(fs::read(dir.path().join("a.raw")).unwrap(), b"hello world");
        assert_eq!(consumer.closed_files()[0].bytes_written, 11);
        assert!(consumer.current_path().is_none());
    }

    #[test]
    fn file_initialize_rotates_to_fresh_file() {
        let dir = tempdir().unwrap();
        let mut consumer = FileConsumer::new();
        consumer.start().unwrap();
        consumer.initialize(dir.path(), "a.raw", 1).unwrap();
        consumer.write_record(b"first").unwrap();
        consumer.initialize(dir.path(), "b.raw", 1).unwrap();
        consumer.write_record(b"second").unwrap();
        consumer.stop().unwrap();

        assert_eq!(fs::read(dir.path().join("a.raw")).unwrap(), b"first");
        assert_eq!(fs::read(dir.path().join("b.raw")).unwrap(), b"second");
        assert_eq!(consumer.closed_files().len(), 2);
    }

    #[test]
    fn file_initialize_truncates_existing_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.raw"), b"stale contents").unwrap();

        let mut consumer = FileConsumer::new();
        consumer.start().unwrap();
        consumer.initialize(dir.path(), "a.raw", 1).unwrap();
        consumer.write_record(b"new").unwrap();
        consumer.stop().unwrap();

        assert_eq!(fs::read(dir.path().join("a.raw")).unwrap(), b"new");
    }

    #[test]
    fn file_creates_destination_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("run000001").join("open");

        let mut consumer = FileConsumer::new();
        consumer.start().unwrap();
        consumer.initialize(&nested, "a.raw", 1).unwrap();
        assert_eq!(consumer.current_path(), Some(nested.join("a.raw").as_path()));
    }

    #[test]
    fn file_rejects_writes_after_stop() {
        let dir = tempdir().unwrap();
        let mut consumer = FileConsumer::new();
        consumer.start().unwrap();
        consumer.initialize(dir.path(), "a.raw", 1).unwrap();
        consumer.stop().unwrap();
        assert!(matches!(
            consumer.write_record(b"late"),
            Err(StorageError::Stopped)
        ));
        assert!(!consumer.is_shared_mode());
    }
}
