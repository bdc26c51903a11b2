//! Generate command implementation.
//!
//! Synthesizes FED-framed fragments and pushes them through a
//! [`WriteSession`] into a run directory.

use super::CliError;
use rawout_codec::fed::{self, MAX_FRAMED_SOURCE_ID};
use rawout_codec::{EventIdentity, FragmentCollection};
use rawout_core::{Config, RunDirectory, WriteSession};
use rawout_storage::FileConsumer;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options of the generate command.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Base output directory.
    pub output: PathBuf,
    /// Run number.
    pub run: u32,
    /// Number of luminosity blocks.
    pub lumis: u32,
    /// Events written per luminosity block.
    pub events_per_lumi: u32,
    /// Optional JSON configuration file.
    pub config: Option<PathBuf>,
    /// Fragment sources per event.
    pub sources: u32,
    /// Fragment body size in bytes.
    pub fragment_size: usize,
}

/// What the generate command wrote.
#[derive(Debug, Serialize)]
pub struct GenerateSummary {
    /// Run directory.
    pub run_dir: String,
    /// Record format version.
    pub format_version: u32,
    /// Events written.
    pub events: u64,
    /// Bytes written.
    pub bytes: u64,
    /// Files in the run directory afterwards.
    pub files: usize,
}

/// Runs the generate command.
pub fn run(options: &GenerateOptions) -> Result<GenerateSummary, Box<dyn std::error::Error>> {
    if options.sources > MAX_FRAMED_SOURCE_ID + 1 {
        return Err(CliError::InvalidArgument(format!(
            "at most {} sources can be framed",
            MAX_FRAMED_SOURCE_ID + 1
        ))
        .into());
    }

    let config = load_config(options.config.as_deref())?;
    let format_version = config.format_version;
    let run_dir = RunDirectory::open(&options.output, options.run, true)?;
    info!(
        "Generating run {} into {} ({} lumis x {} events, {} sources)",
        options.run,
        run_dir.path().display(),
        options.lumis,
        options.events_per_lumi,
        options.sources
    );
    let mut session = WriteSession::new(
        config,
        Box::new(FileConsumer::new()),
        Box::new(run_dir.clone()),
    )?;

    let mut events = 0u64;
    let mut bytes = 0u64;
    let mut event = 0u32;

    session.begin_run(options.run)?;
    for lumi in 1..=options.lumis {
        session.begin_boundary(lumi)?;
        for _ in 0..options.events_per_lumi {
            event += 1;
            let fragments = synthesize(event, options.sources, options.fragment_size)?;
            let outcome =
                session.write_event(&EventIdentity::new(options.run, lumi, event), &fragments)?;
            events += 1;
            bytes += outcome.record_size as u64;
        }
        session.end_boundary(lumi)?;
    }
    session.end_run()?;

    info!("Wrote {} events ({} bytes)", events, bytes);

    Ok(GenerateSummary {
        run_dir: run_dir.path().display().to_string(),
        format_version,
        events,
        bytes,
        files: run_dir.raw_files()?.len(),
    })
}

/// Prints a summary in text form.
pub fn print_summary(summary: &GenerateSummary) {
    println!("Run directory: {}", summary.run_dir);
    println!("Format:        v{}", summary.format_version);
    println!("Events:        {}", summary.events);
    println!("Bytes:         {}", summary.bytes);
    println!("Files:         {}", summary.files);
}

/// Loads a session configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

/// Builds one framed fragment per source with a deterministic body.
fn synthesize(
    event: u32,
    sources: u32,
    fragment_size: usize,
) -> Result<FragmentCollection, Box<dyn std::error::Error>> {
    let mut fragments = FragmentCollection::new();
    for source in 0..sources {
        let body: Vec<u8> = (0..fragment_size)
            .map(|i| (event as usize + source as usize + i) as u8)
            .collect();
        fragments.insert(source, fed::frame(source, event, &body)?)?;
    }
    Ok(fragments)
}
