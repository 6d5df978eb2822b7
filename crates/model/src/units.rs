//! # Length Units
//!
//! Conversion between the document's internal length unit and display
//! units, plus the formatter that renders elevations as attribute text.
//!
//! ## Conversion Reference
//!
//! | Unit | To Meters |
//! |------|-----------|
//! | 1 meter | 1.0 |
//! | 1 centimeter | 0.01 |
//! | 1 millimeter | 0.001 |
//! | 1 foot | 0.3048 |
//! | 1 inch | 0.0254 |
//!
//! ## Table of Contents
//! 1. Constants
//! 2. LengthUnit
//! 3. UnitFormatter
//! 4. ProjectUnits

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// 1. Constants
// ============================================================================

/// 1 foot = 0.3048 meters
pub const FOOT_TO_METERS: f64 = 0.3048;
/// 1 inch = 0.0254 meters
pub const INCH_TO_METERS: f64 = 0.0254;

// ============================================================================
// 2. LengthUnit
// ============================================================================

/// Length unit used for internal storage or display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Meters,
    Centimeters,
    Millimeters,
    Feet,
    Inches,
}

impl LengthUnit {
    /// Convert a value in this unit to meters
    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            LengthUnit::Meters => value,
            LengthUnit::Centimeters => value * 0.01,
            LengthUnit::Millimeters => value * 0.001,
            LengthUnit::Feet => value * FOOT_TO_METERS,
            LengthUnit::Inches => value * INCH_TO_METERS,
        }
    }

    /// Convert a value in meters to this unit
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            LengthUnit::Meters => meters,
            LengthUnit::Centimeters => meters * 100.0,
            LengthUnit::Millimeters => meters * 1000.0,
            LengthUnit::Feet => meters / FOOT_TO_METERS,
            LengthUnit::Inches => meters / INCH_TO_METERS,
        }
    }

    /// Convert a value in this unit to `target`
    pub fn convert(&self, value: f64, target: LengthUnit) -> f64 {
        if *self == target {
            return value;
        }
        target.from_meters(self.to_meters(value))
    }

    /// Short symbol appended to formatted values
    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Meters => "m",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Millimeters => "mm",
            LengthUnit::Feet => "ft",
            LengthUnit::Inches => "in",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(LengthUnit::Meters),
            "cm" | "centimeter" | "centimeters" => Ok(LengthUnit::Centimeters),
            "mm" | "millimeter" | "millimeters" => Ok(LengthUnit::Millimeters),
            "ft" | "foot" | "feet" => Ok(LengthUnit::Feet),
            "in" | "inch" | "inches" => Ok(LengthUnit::Inches),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// 3. UnitFormatter
// ============================================================================

/// Renders internal length values as display text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFormatter {
    /// Display unit
    #[serde(default)]
    pub unit: LengthUnit,
    /// Digits after the decimal point
    #[serde(default = "default_decimals")]
    pub decimals: usize,
    /// Append the unit symbol ("2.50 m" instead of "2.50")
    #[serde(default = "default_true")]
    pub show_symbol: bool,
}

fn default_decimals() -> usize { 2 }
fn default_true() -> bool { true }

impl Default for UnitFormatter {
    fn default() -> Self {
        Self {
            unit: LengthUnit::Meters,
            decimals: default_decimals(),
            show_symbol: true,
        }
    }
}

impl UnitFormatter {
    /// Format `value`, given in `internal` units, in the display unit
    pub fn format(&self, value: f64, internal: LengthUnit) -> String {
        let display = internal.convert(value, self.unit);
        let mut text = format!("{:.*}", self.decimals, display);
        // "-0.00" reads as a sign error on a floor elevation
        if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
            text.remove(0);
        }
        if self.show_symbol {
            text.push(' ');
            text.push_str(self.unit.symbol());
        }
        text
    }

    /// Parse display text back into an internal value (inverse of `format`)
    pub fn parse(&self, text: &str, internal: LengthUnit) -> Option<f64> {
        let trimmed = text.trim();
        let numeric = trimmed
            .strip_suffix(self.unit.symbol())
            .unwrap_or(trimmed)
            .trim();
        let display: f64 = numeric.parse().ok()?;
        Some(self.unit.convert(display, internal))
    }
}

// ============================================================================
// 4. ProjectUnits
// ============================================================================

/// Unit settings stored with a document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectUnits {
    /// Unit every stored length (elevations, offsets, coordinates) is in
    #[serde(default)]
    pub internal: LengthUnit,
    /// Display formatting for length texts
    #[serde(default)]
    pub format: UnitFormatter,
}

impl ProjectUnits {
    /// Convert `value` given in `unit` to the internal unit
    pub fn to_internal(&self, value: f64, unit: LengthUnit) -> f64 {
        unit.convert(value, self.internal)
    }
}
