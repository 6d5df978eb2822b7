//! # Attribute Writer
//!
//! Writes the clearance and the two elevation texts onto a space through
//! the tri-state capability. Absent, mismatched or read-only attributes
//! are skipped with a `debug` event and never reported.
//!
//! Both texts are cleared before a space is computed, so a branch that does
//! not produce a text leaves it empty instead of stale.

use headroom_model::{Capability, ElementId, LengthUnit, MutationScope, Result, UnitFormatter};
use tracing::debug;

use crate::config::AttributeNames;

pub struct AttributeWriter<'c> {
    names: &'c AttributeNames,
    formatter: UnitFormatter,
    internal: LengthUnit,
}

impl<'c> AttributeWriter<'c> {
    pub fn new(names: &'c AttributeNames, formatter: UnitFormatter, internal: LengthUnit) -> Self {
        Self {
            names,
            formatter,
            internal,
        }
    }

    /// Clear both elevation texts
    pub fn reset_texts(&self, scope: &mut MutationScope<'_>, space: ElementId) -> Result<()> {
        for name in [&self.names.floor_elevation, &self.names.ceiling_bottom] {
            let capability = scope.clear_text(space, name)?;
            log_skip(space, name, capability);
        }
        Ok(())
    }

    /// Write the numeric clearance. Returns whether the attribute was writable.
    pub fn write_clearance(&self, scope: &mut MutationScope<'_>, space: ElementId, value: f64) -> Result<bool> {
        let capability = scope.set_attribute(space, &self.names.clearance, value)?;
        log_skip(space, &self.names.clearance, capability);
        Ok(capability.is_writable())
    }

    pub fn write_floor_elevation(&self, scope: &mut MutationScope<'_>, space: ElementId, elevation: f64) -> Result<()> {
        self.write_text(scope, space, &self.names.floor_elevation, elevation)
    }

    pub fn write_ceiling_bottom(&self, scope: &mut MutationScope<'_>, space: ElementId, elevation: f64) -> Result<()> {
        self.write_text(scope, space, &self.names.ceiling_bottom, elevation)
    }

    /// Display text for an internal elevation
    pub fn format(&self, elevation: f64) -> String {
        self.formatter.format(elevation, self.internal)
    }

    fn write_text(&self, scope: &mut MutationScope<'_>, space: ElementId, name: &str, elevation: f64) -> Result<()> {
        let capability = scope.set_attribute(space, name, self.format(elevation))?;
        log_skip(space, name, capability);
        Ok(())
    }
}

fn log_skip(space: ElementId, attribute: &str, capability: Capability) {
    if !capability.is_writable() {
        debug!(space = %space, attribute, capability = %capability, "Attribute not writable; skipped");
    }
}
