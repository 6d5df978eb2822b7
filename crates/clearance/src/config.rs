//! # Clearance Configuration
//!
//! Target attribute names, the probed surface category, the search margin
//! and display formatting. Every field has a default, so an empty
//! `[clearance]` table (or none at all) gives the standard behavior.
//!
//! ```toml
//! [clearance]
//! surface_category = "ceiling"
//! margin = 1.0
//! margin_unit = "meters"
//!
//! [clearance.attributes]
//! clearance = "KAI_GEO_Lichte_Höhe"
//!
//! [clearance.display]
//! unit = "centimeters"
//! decimals = 0
//! ```

use std::path::Path;

use headroom_model::{Category, LengthUnit, ProjectUnits, UnitFormatter};
use serde::{Deserialize, Serialize};

use crate::error::{ClearanceError, Result};

/// Clearance engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceConfig {
    #[serde(default)]
    pub attributes: AttributeNames,
    /// Category the vertical probe is restricted to
    #[serde(default = "default_surface_category")]
    pub surface_category: Category,
    /// Added to the nominal height to get the probe's reach
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default)]
    pub margin_unit: LengthUnit,
    /// Overrides the document's display formatter for elevation texts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<UnitFormatter>,
}

/// Names of the three space attributes the engine writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeNames {
    /// Numeric clearance
    #[serde(default = "default_clearance_attr")]
    pub clearance: String,
    /// Text: finished floor elevation
    #[serde(default = "default_floor_attr")]
    pub floor_elevation: String,
    /// Text: underside of the ceiling
    #[serde(default = "default_ceiling_attr")]
    pub ceiling_bottom: String,
}

fn default_surface_category() -> Category { Category::Ceiling }
fn default_margin() -> f64 { 1.0 }
fn default_clearance_attr() -> String { "KAI_GEO_Lichte_Höhe".to_string() }
fn default_floor_attr() -> String { "KAI_GEO_Höhe_FBOK".to_string() }
fn default_ceiling_attr() -> String { "KAI_GEO_Höhe_UK_Decke".to_string() }

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            clearance: default_clearance_attr(),
            floor_elevation: default_floor_attr(),
            ceiling_bottom: default_ceiling_attr(),
        }
    }
}

impl Default for ClearanceConfig {
    fn default() -> Self {
        Self {
            attributes: AttributeNames::default(),
            surface_category: default_surface_category(),
            margin: default_margin(),
            margin_unit: LengthUnit::default(),
            display: None,
        }
    }
}

impl ClearanceConfig {
    /// Load from a standalone TOML file holding the clearance table's fields
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ClearanceError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Search margin in the document's internal unit
    pub fn margin_internal(&self, units: &ProjectUnits) -> f64 {
        units.to_internal(self.margin, self.margin_unit)
    }

    /// Formatter for elevation texts: the override, else the document's
    pub fn formatter(&self, units: &ProjectUnits) -> UnitFormatter {
        self.display.clone().unwrap_or_else(|| units.format.clone())
    }
}
