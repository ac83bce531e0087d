//! seglog CLI
//!
//! Command-line tools for seglog log directories.
//!
//! # Commands
//!
//! - `pipe` - Log standard input into a rotating directory
//! - `segments` - List the segment files of a directory
//! - `sweep` - Delete segments past the retention horizon

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use seglog_core::{Flags, Level};
use seglog_sink::DEFAULT_RETENTION_DAYS;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// seglog command-line log directory tools.
#[derive(Parser)]
#[command(name = "seglog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the log directory
    #[arg(global = true, short, long)]
    dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format of listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human readable text.
    Text,
    /// JSON.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Log every line of standard input into the directory
    Pipe {
        /// Level of the records
        #[arg(short, long, default_value = "info")]
        level: Level,

        /// Output flags, e.g. "date|milliseconds|name"
        #[arg(short, long, default_value = "date|milliseconds|name")]
        flags: Flags,

        /// Logger name
        #[arg(short, long, default_value = "")]
        name: String,

        /// Rotation size in MiB
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u64).range(1..))]
        max_size_mib: u64,

        /// Days of segments to keep
        #[arg(long, default_value_t = DEFAULT_RETENTION_DAYS)]
        retention_days: u32,

        /// Do not maintain the latest.log link
        #[arg(long)]
        no_latest_link: bool,

        /// Write JSON records instead of text
        #[arg(long)]
        json: bool,
    },

    /// List segment files, newest first
    Segments {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Delete segments older than the retention horizon
    Sweep {
        /// Days of segments to keep
        #[arg(long, default_value_t = DEFAULT_RETENTION_DAYS)]
        retention_days: u32,

        /// Dry run - show what would be deleted
        #[arg(short = 'n', long)]
        dry_run: bool,
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
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pipe {
            level,
            flags,
            name,
            max_size_mib,
            retention_days,
            no_latest_link,
            json,
        } => {
            let dir = cli.dir.ok_or("Log directory required for pipe")?;
            let options = commands::pipe::PipeOptions {
                level,
                flags,
                name,
                max_size_mib,
                retention_days,
                latest_link: !no_latest_link,
                json,
            };
            let stdin = std::io::stdin();
            commands::pipe::run(&dir, &options, stdin.lock())?;
        }
        Commands::Segments { format } => {
            let dir = cli.dir.ok_or("Log directory required for segments")?;
            commands::segments::run(&dir, format)?;
        }
        Commands::Sweep {
            retention_days,
            dry_run,
        } => {
            let dir = cli.dir.ok_or("Log directory required for sweep")?;
            commands::sweep::run(&dir, retention_days, dry_run)?;
        }
        Commands::Version => {
            println!("seglog CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
