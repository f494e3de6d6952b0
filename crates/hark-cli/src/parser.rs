//! Top-level argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Read newsletter cards aloud from the terminal.
#[derive(Parser)]
#[command(name = "hark")]
#[command(about = "Narrated card reader")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to $HARK_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
