//! `hark config`.

use anyhow::Result;

use super::LoadedSettings;

pub fn execute(loaded: &LoadedSettings) -> Result<()> {
    match &loaded.path {
        Some(path) if path.exists() => println!("# {}", path.display()),
        Some(path) => println!("# {} (not found, using defaults)", path.display()),
        None => println!("# no config directory, using defaults"),
    }
    println!("{}", serde_json::to_string_pretty(&loaded.settings)?);
    Ok(())
}
