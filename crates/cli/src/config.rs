//! `headroom.toml`: project-level settings for the command layer.
//!
//! ```toml
//! [clearance]
//! margin = 1.0
//! margin_unit = "meters"
//!
//! [clearance.display]
//! unit = "centimeters"
//! decimals = 0
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use headroom_clearance::ClearanceConfig;
use serde::Deserialize;
use tracing::debug;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "headroom.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HeadroomConfig {
    #[serde(default)]
    pub clearance: ClearanceConfig,
}

impl HeadroomConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("In {}", path.display()))
    }

    /// The explicit file, else `./headroom.toml` if present, else defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            debug!(path = %fallback.display(), "Using config from working directory");
            return Self::from_file(&fallback);
        }
        Ok(Self::default())
    }
}
