//! Command handlers, one module per subcommand.

pub mod cards;
pub mod config;
pub mod read;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use hark_core::Settings;

/// Settings plus the file they were resolved from.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub path: Option<PathBuf>,
}

/// Resolve and load settings; a missing file yields defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<LoadedSettings> {
    let path = Settings::resolve_path(explicit);
    let settings = match &path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    Ok(LoadedSettings { settings, path })
}
