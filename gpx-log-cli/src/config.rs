//! Run configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Optional run configuration (loaded from config.toml)
///
/// Every field is optional. Values given here preset the run; explicit
/// command-line flags always win.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunConfig {
    /// Go/no-go signal threshold in dBm
    pub gothresh: Option<i32>,
    /// Merge the extracted readings into the output as waypoints
    pub merge: Option<bool>,
    /// Report each extracted reading with its correlated co-ordinates
    pub verbose: Option<bool>,
    /// Output file for the combined document
    pub output: Option<PathBuf>,
}

/// Load a run configuration from a TOML file
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: RunConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
