//! Verify command implementation.

use super::CliError;
use rawout_codec::RecordIterator;
use rawout_core::RAW_EXTENSION;
use std::fs;
use std::path::{Path, PathBuf};

/// Verification result for one file.
#[derive(Debug)]
pub struct FileReport {
    /// File checked.
    pub path: PathBuf,
    /// Records that decoded and matched their checksum.
    pub valid_records: usize,
    /// Bytes covered by valid records.
    pub valid_bytes: usize,
    /// First error found, with its byte offset.
    pub error: Option<String>,
}

impl FileReport {
    fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<Vec<FileReport>, Box<dyn std::error::Error>> {
    println!("Verifying {}", path.display());
    println!();

    let files = collect_files(path)?;
    if files.is_empty() {
        return Err(CliError::NoRawFiles(path.display().to_string()).into());
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let report = verify_file(&file)?;
        print_report(&report);
        reports.push(report);
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    println!();
    if failed == 0 {
        println!("✓ Verification passed ({} files)", reports.len());
        Ok(reports)
    } else {
        println!("✗ Verification failed");
        Err(CliError::VerificationFailed {
            failed,
            checked: reports.len(),
        }
        .into())
    }
}

/// Checks every record of one file.
pub fn verify_file(path: &Path) -> std::io::Result<FileReport> {
    let data = fs::read(path)?;
    let mut report = FileReport {
        path: path.to_path_buf(),
        valid_records: 0,
        valid_bytes: 0,
        error: None,
    };

    let mut records = RecordIterator::new(&data);
    while let Some(item) = records.next() {
        match item {
            Ok((_, record)) => {
                report.valid_records += 1;
                report.valid_bytes += record.total_size();
            }
            Err(e) => {
                report.error = Some(format!("offset {}: {}", records.offset(), e));
            }
        }
    }
    Ok(report)
}

fn collect_files(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let file = entry?.path();
        if file.is_file() && file.extension().is_some_and(|ext| ext == RAW_EXTENSION) {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}

fn print_report(report: &FileReport) {
    match &report.error {
        None => println!(
            "  ok    {} ({} records, {} bytes)",
            report.path.display(),
            report.valid_records,
            report.valid_bytes
        ),
        Some(error) => println!(
            "  FAIL  {} after {} records: {}",
            report.path.display(),
            report.valid_records,
            error
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::generate::{self, GenerateOptions};
    use tempfile::tempdir;

    fn generated_run(base: &Path) -> PathBuf {
        let options = GenerateOptions {
            output: base.to_path_buf(),
            run: 3,
            lumis: 2,
            events_per_lumi: 4,
            config: None,
            sources: 2,
            fragment_size: 16,
        };
        PathBuf::from(generate::run(&options).unwrap().run_dir)
    }

    #[test]
    fn generated_run_verifies() {
        let dir = tempdir().unwrap();
        let run_dir = generated_run(dir.path());
        let reports = run(&run_dir).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.valid_records == 4));
    }

    #[test]
    fn corrupted_payload_fails() {
        let dir = tempdir().unwrap();
        let run_dir = generated_run(dir.path());
        let files = collect_files(&run_dir).unwrap();

        let mut data = fs::read(&files[0]).unwrap();
        let last = data.len() - 20;
        data[last] ^= 0xFF;
        fs::write(&files[0], &data).unwrap();

        let report = verify_file(&files[0]).unwrap();
        assert_eq!(report.valid_records, 3);
        assert!(report.error.unwrap().contains("checksum"));
        assert!(run(&run_dir).is_err());
    }

    #[test]
    fn empty_directory_has_no_raw_files() {
        let dir = tempdir().unwrap();
        assert!(run(dir.path()).is_err());
    }
}
