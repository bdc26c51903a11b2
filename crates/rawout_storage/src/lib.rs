//! # rawout Storage
//!
//! Output consumers for encoded records.
//!
//! Consumers are **opaque byte sinks**: they open destinations, accept
//! whole records and close destinations at luminosity-block boundaries.
//! They know nothing about the record format.
//!
//! ## Available Consumers
//!
//! - [`FileConsumer`] - writes each destination to its own file
//! - [`InMemoryConsumer`] - keeps destinations in memory, for testing
//! - [`SharedBufferConsumer`] - shared mode; hands records to an aggregator
//!
//! ## Example
//!
//! ```rust
//! use rawout_storage::{InMemoryConsumer, OutputConsumer};
//! use std::path::Path;
//!
//! let mut consumer = InMemoryConsumer::new();
//! consumer.start().unwrap();
//! consumer.initialize(Path::new("run000001"), "run000001_ls0001_index000000.raw", 1).unwrap();
//! consumer.write_record(&[5, 0, 0, 0]).unwrap();
//! consumer.end_of_boundary(1).unwrap();
//! consumer.stop().unwrap();
//! assert_eq!(consumer.record_count(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod consumer;
mod error;
mod file;
mod memory;
mod shared;

pub use consumer::OutputConsumer;
pub use error::{StorageError, StorageResult};
pub use file::{ClosedFile, FileConsumer};
pub use memory::{ConsumerEvent, InMemoryConsumer, MemoryDestination};
pub use shared::{SharedBufferConsumer, SharedQueue, SharedRecord};
