//! # Door Number Options
//!
//! How door numbers are composed, and whether the door updater runs
//! automatically. The last-used options are remembered per user in
//! `<config dir>/headroom/door-options.toml`.
//!
//! ## Table of Contents
//! 1. DoorNumberOptions
//! 2. OptionsStore — per-user persistence

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PropagationError, Result};

// ============================================================================
// 1. DoorNumberOptions
// ============================================================================

/// Door numbering settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorNumberOptions {
    /// Text attribute on the door appended to the number; empty for none
    #[serde(default)]
    pub extra_attribute: String,
    /// Placed between the base number and the extra value
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Attribute receiving the composed number
    #[serde(default = "default_number_attribute")]
    pub number_attribute: String,
    /// Run the door updater on door and wall edits
    #[serde(default = "default_auto_update")]
    pub auto_update: bool,
}

fn default_separator() -> String { "-".to_string() }
fn default_number_attribute() -> String { "KAI_TUE_Nummer".to_string() }
fn default_auto_update() -> bool { true }

impl Default for DoorNumberOptions {
    fn default() -> Self {
        Self {
            extra_attribute: String::new(),
            separator: default_separator(),
            number_attribute: default_number_attribute(),
            auto_update: default_auto_update(),
        }
    }
}

impl DoorNumberOptions {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ============================================================================
// 2. OptionsStore — per-user persistence
// ============================================================================

/// File holding the last-used door options
#[derive(Debug, Clone)]
pub struct OptionsStore {
    path: PathBuf,
}

impl OptionsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform config dir (`~/.config/headroom/` on Linux)
    pub fn user() -> Result<Self> {
        let dir = dirs::config_dir().ok_or(PropagationError::NoConfigDir)?;
        Ok(Self::new(dir.join("headroom").join("door-options.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored options, or the defaults when nothing was saved yet. A file
    /// that exists but does not parse is an error.
    pub fn load(&self) -> Result<DoorNumberOptions> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No stored door options; using defaults");
            return Ok(DoorNumberOptions::default());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| PropagationError::io(&self.path, e))?;
        DoorNumberOptions::from_toml_str(&content).inspect_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Stored door options are invalid");
        })
    }

    pub fn save(&self, options: &DoorNumberOptions) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PropagationError::io(parent, e))?;
        }
        let content = options.to_toml_string()?;
        std::fs::write(&self.path, content).map_err(|e| PropagationError::io(&self.path, e))?;
        info!(path = %self.path.display(), "Door options saved");
        Ok(())
    }
}
