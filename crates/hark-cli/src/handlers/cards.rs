//! `hark cards`.

use std::path::Path;

use anyhow::{Context, Result};

use hark_core::{ContentSource, Settings};
use hark_reader::JsonContentSource;

use crate::presentation::print_card_table;

pub async fn execute(file: &Path, settings: &Settings) -> Result<()> {
    let source = JsonContentSource::new(file);
    let cards = source
        .list_cards()
        .await
        .with_context(|| format!("Failed to read cards from {}", file.display()))?;

    print_card_table(&cards, settings.speech.chars_per_second);
    Ok(())
}
