//! Show the effective configuration.

use anyhow::{Context, Result};
use std::path::Path;
use tandem_client::Config;

/// Render `config` as TOML.
pub fn render(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config")
}

/// Run the config command.
pub fn run(path: &Path, config: &Config, path_only: bool) -> Result<()> {
    if path_only {
        println!("{}", path.display());
        return Ok(());
    }

    if path.exists() {
        println!("# loaded from {}", path.display());
    } else {
        println!("# {} not found, showing defaults", path.display());
    }
    print!("{}", render(config)?);
    Ok(())
}
