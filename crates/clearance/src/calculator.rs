//! # Clearance Calculator
//!
//! Turns the probe result into a clearance. The nearest hit wins when its
//! surface resolves an envelope in the scene; otherwise the nominal upper
//! bound stands in for the ceiling.
//!
//! ## Table of Contents
//! 1. Clearance
//! 2. calculate

use headroom_model::{Document, Hit, View};

use crate::elevation::UpperBound;

// ============================================================================
// 1. Clearance
// ============================================================================

/// How the clearance was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Underside of the nearest ceiling
    Ceiling,
    /// No usable hit; nominal upper bound
    Fallback,
}

/// Computed clearance of one space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clearance {
    pub value: f64,
    /// Envelope min Z of the hit surface, on the ceiling branch only
    pub ceiling_bottom: Option<f64>,
    pub branch: Branch,
}

impl Clearance {
    /// Only strictly positive clearances are written
    pub fn is_positive(&self) -> bool {
        self.value > 0.0
    }
}

// ============================================================================
// 2. calculate
// ============================================================================

/// Clearance above `base` given the probe `hits` (nearest first)
pub fn calculate(doc: &Document, view: &View, hits: &[Hit], base: f64, upper: &UpperBound) -> Clearance {
    let ceiling = hits
        .first()
        .and_then(|hit| doc.bounding_envelope(hit.surface, view))
        .map(|envelope| envelope.min_z());

    match ceiling {
        Some(bottom) => Clearance {
            value: bottom - base,
            ceiling_bottom: Some(bottom),
            branch: Branch::Ceiling,
        },
        None => Clearance {
            value: upper.elevation - base,
            ceiling_bottom: None,
            branch: Branch::Fallback,
        },
    }
}
