//! CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hark_cli::{Cli, Commands, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables (HARK_CONFIG, RUST_LOG) before anything reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr; stdout belongs to the reader's status lines
    let default_filter = if cli.verbose { "hark=debug" } else { "hark=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let loaded = handlers::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Cards { file } => handlers::cards::execute(&file, &loaded.settings).await,
        Commands::Config => handlers::config::execute(&loaded),
        Commands::Read { file, card } => {
            handlers::read::execute(&file, card, &loaded.settings).await
        }
    }
}
