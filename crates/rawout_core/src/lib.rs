//! # rawout Core
//!
//! Write session for raw event records.
//!
//! This crate provides:
//! - [`WriteSession`], driving encoding, rotation and the output consumer
//!   through the run / luminosity-block lifecycle
//! - [`RotationPolicy`], switching destinations every N events
//! - [`Placement`] and [`RunDirectory`], naming destinations on disk
//! - [`Config`] and per-block [`SessionStats`]
//!
//! ## Example
//!
//! ```rust
//! use rawout_codec::{EventIdentity, FragmentCollection};
//! use rawout_core::{Config, RunDirectory, WriteSession};
//! use rawout_storage::FileConsumer;
//!
//! let base = tempfile::tempdir().unwrap();
//! let run_dir = RunDirectory::open(base.path(), 1, true).unwrap();
//! let config = Config::new().events_per_destination(2);
//! let mut session = WriteSession::new(
//!     config,
//!     Box::new(FileConsumer::new()),
//!     Box::new(run_dir.clone()),
//! )
//! .unwrap();
//!
//! session.begin_run(1).unwrap();
//! session.begin_boundary(1).unwrap();
//! for event in 1..=3 {
//!     let fragments = FragmentCollection::new().with(0, vec![0u8; 8]).unwrap();
//!     session.write_event(&EventIdentity::new(1, 1, event), &fragments).unwrap();
//! }
//! session.end_boundary(1).unwrap();
//! session.end_run().unwrap();
//!
//! assert_eq!(run_dir.raw_files().unwrap().len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod placement;
mod rotation;
mod session;
mod stats;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use placement::{
    parse_raw_file_name, raw_file_name, run_dir_name, Placement, RunDirectory, RAW_EXTENSION,
};
pub use rotation::{RotationDecision, RotationPolicy};
pub use session::{WriteOutcome, WriteSession};
pub use stats::{BoundaryReport, SessionStats};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
