//! rawout CLI
//!
//! Command-line tools for raw event record files.
//!
//! # Commands
//!
//! - `generate` - Write synthetic events through a write session
//! - `inspect` - List the records of a file
//! - `verify` - Re-check record structure and checksums

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// rawout command-line tools.
#[derive(Parser)]
#[command(name = "rawout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write synthetic events to a run directory
    Generate {
        /// Base output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Run number
        #[arg(short, long, default_value = "1")]
        run: u32,

        /// Number of luminosity blocks
        #[arg(short, long, default_value = "1")]
        lumis: u32,

        /// Events per luminosity block
        #[arg(short, long, default_value = "10")]
        events: u32,

        /// Session configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of fragment sources per event
        #[arg(short, long, default_value = "8")]
        sources: u32,

        /// Fragment body size in bytes
        #[arg(short, long, default_value = "256")]
        fragment_size: usize,
    },

    /// List the records of a raw file
    Inspect {
        /// Raw file to read
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Maximum number of records to list
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Verify every record of a raw file or directory
    Verify {
        /// Raw file, or directory of raw files
        path: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Generate {
            output,
            run,
            lumis,
            events,
            config,
            sources,
            fragment_size,
        } => {
            let options = commands::generate::GenerateOptions {
                output,
                run,
                lumis,
                events_per_lumi: events,
                config,
                sources,
                fragment_size,
            };
            let summary = commands::generate::run(&options)?;
            commands::generate::print_summary(&summary);
        }
        Commands::Inspect {
            file,
            format,
            limit,
        } => {
            commands::inspect::run(&file, &format, limit)?;
        }
        Commands::Verify { path } => {
            commands::verify::run(&path)?;
        }
        Commands::Version => {
            println!("rawout CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("rawout Core v{}", rawout_core::VERSION);
            println!(
                "Record formats v{}..v{}",
                rawout_codec::MIN_VERSION,
                rawout_codec::MAX_VERSION
            );
        }
    }

    Ok(())
}
