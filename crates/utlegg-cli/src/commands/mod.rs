//! Subcommands of the `utlegg` binary.

pub mod categories;
pub mod config;
pub mod generate;
pub mod validate;

use std::path::{Path, PathBuf};

use tracing::debug;
use utlegg_core::models::UtleggConfig;

/// `<config dir>/utlegg/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("utlegg")
        .join("config.json")
}

/// Load the configuration from `path`, falling back to the default
/// location and then to built-in defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<UtleggConfig> {
    if let Some(path) = path {
        return Ok(UtleggConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        Ok(UtleggConfig::from_file(&default_path)?)
    } else {
        Ok(UtleggConfig::default())
    }
}
