//! Destination placement.
//!
//! The write session does not decide where records go. It asks a
//! [`Placement`] for the destination directory and for the name of each
//! `(lumi, index)` destination. [`RunDirectory`] is the file-system
//! implementation:
//!
//! ```text
//! <base>/
//! └─ run000001/
//!    ├─ run000001_ls0001_index000000.raw
//!    ├─ run000001_ls0001_index000001.raw
//!    └─ run000001_ls0002_index000000.raw
//! ```

use crate::error::{CoreError, CoreResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of raw output files.
pub const RAW_EXTENSION: &str = "raw";

/// Provides destination directories and names.
pub trait Placement: Send {
    /// Directory all destinations of the run are created in.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be provided.
    fn destination_dir(&self) -> CoreResult<PathBuf>;

    /// Name of destination `index` within luminosity block `lumi`.
    ///
    /// # Errors
    ///
    /// Returns an error if no name can be assigned.
    fn destination_name(&self, lumi: u32, index: u32) -> CoreResult<String>;
}

/// Per-run output directory on the local file system.
#[derive(Debug, Clone)]
pub struct RunDirectory {
    run: u32,
    path: PathBuf,
}

impl RunDirectory {
    /// Opens the directory for `run` under `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory doesn't exist and
    /// `create_if_missing` is false, if the path is not a directory, or on
    /// I/O errors.
    pub fn open(base: &Path, run: u32, create_if_missing: bool) -> CoreResult<Self> {
        let path = base.join(run_dir_name(run));

        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(&path)?;
            } else {
                return Err(CoreError::placement(format!(
                    "run directory does not exist: {}",
                    path.display()
                )));
            }
        }

        if !path.is_dir() {
            return Err(CoreError::placement(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        Ok(Self { run, path })
    }

    /// Run number this directory belongs to.
    #[must_use]
    pub fn run(&self) -> u32 {
        self.run
    }

    /// Path of the run directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw files currently in the run directory, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn raw_files(&self) -> CoreResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == RAW_EXTENSION) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Placement for RunDirectory {
    fn destination_dir(&self) -> CoreResult<PathBuf> {
        Ok(self.path.clone())
    }

    fn destination_name(&self, lumi: u32, index: u32) -> CoreResult<String> {
        Ok(raw_file_name(self.run, lumi, index))
    }
}

/// Directory name for `run`.
#[must_use]
pub fn run_dir_name(run: u32) -> String {
    format!("run{run:06}")
}

/// File name for destination `index` of `lumi` in `run`.
#[must_use]
pub fn raw_file_name(run: u32, lumi: u32, index: u32) -> String {
    format!("run{run:06}_ls{lumi:04}_index{index:06}.{RAW_EXTENSION}")
}

/// Parses `(run, lumi, index)` back out of a raw file name.
#[must_use]
pub fn parse_raw_file_name(name: &str) -> Option<(u32, u32, u32)> {
    let stem = name.strip_suffix(".raw")?;
    let mut parts = stem.split('_');
    let run = parts.next()?.strip_prefix("run")?.parse().ok()?;
    let lumi = parts.next()?.strip_prefix("ls")?.parse().ok()?;
    let index = parts.next()?.strip_prefix("index")?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((run, lumi, index))
}
