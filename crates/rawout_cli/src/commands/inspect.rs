//! Inspect command implementation.

use super::CliError;
use rawout_codec::{CodecResult, DecodedRecord, RecordIterator};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One listed record.
#[derive(Debug, Serialize)]
pub struct RecordSummary {
    /// Byte offset within the file.
    pub offset: usize,
    /// Format version.
    pub version: u32,
    /// Run number.
    pub run: u32,
    /// Luminosity block.
    pub lumi: u32,
    /// Event number.
    pub event: u32,
    /// Total record size.
    pub size: usize,
    /// Payload size.
    pub payload_size: usize,
    /// Number of fragments, if the payload could be split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragments: Option<usize>,
    /// Header flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u16>,
    /// Stored checksum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<u32>,
}

impl RecordSummary {
    fn from_record(offset: usize, record: &DecodedRecord<'_>) -> Self {
        Self {
            offset,
            version: record.version.as_u32(),
            run: record.identity.run,
            lumi: record.identity.lumi,
            event: record.identity.event,
            size: record.total_size(),
            payload_size: record.payload.len(),
            fragments: record.fragments().ok().map(|f| f.len()),
            flags: record.flags,
            checksum: record.checksum,
        }
    }
}

/// Runs the inspect command.
pub fn run(
    path: &Path,
    format: &str,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    if format != "text" && format != "json" {
        return Err(CliError::InvalidFormat(format.to_string()).into());
    }

    let data = fs::read(path)?;
    let records = summarize(&data, limit)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        _ => print_text_output(path, &records),
    }
    Ok(())
}

/// Decodes up to `limit` records from `data`.
///
/// # Errors
///
/// Returns the first decoding error.
pub fn summarize(data: &[u8], limit: Option<usize>) -> CodecResult<Vec<RecordSummary>> {
    RecordIterator::new(data)
        .take(limit.unwrap_or(usize::MAX))
        .map(|item| item.map(|(offset, record)| RecordSummary::from_record(offset, &record)))
        .collect()
}

fn print_text_output(path: &Path, records: &[RecordSummary]) {
    println!("File: {}", path.display());
    println!("Records: {}", records.len());
    println!();
    println!(
        "{:>10}  {:>3}  {:>22}  {:>9}  {:>5}  {:>10}",
        "offset", "ver", "run:lumi:event", "size", "frags", "checksum"
    );
    for r in records {
        let id = format!("{}:{}:{}", r.run, r.lumi, r.event);
        let fragments = r.fragments.map_or_else(|| "-".to_string(), |n| n.to_string());
        let checksum = r
            .checksum
            .map_or_else(|| "-".to_string(), |c| format!("{c:#010x}"));
        println!(
            "{:>10}  {:>3}  {:>22}  {:>9}  {:>5}  {:>10}",
            r.offset, r.version, id, r.size, fragments, checksum
        );
    }
}
