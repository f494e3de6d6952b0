//! Subcommands.

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// List the cards in a content file
    Cards {
        /// JSON content file
        file: PathBuf,
    },

    /// Print the effective settings
    Config,

    /// Open the interactive reader
    Read {
        /// JSON content file
        file: PathBuf,

        /// Index of the card to open first
        #[arg(long, default_value_t = 0)]
        card: usize,
    },
}
