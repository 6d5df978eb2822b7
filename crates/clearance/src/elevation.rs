//! # Elevation Resolvers
//!
//! The two vertical anchors of a space: the base elevation the probe starts
//! from, and the nominal upper elevation that bounds how far it reaches.
//!
//! The base is always `level.elevation + lower_offset`. It never comes from
//! the space's own envelope.
//!
//! ## Table of Contents
//! 1. Base elevation
//! 2. Upper bound

use headroom_model::{Document, Space};

// ============================================================================
// 1. Base elevation
// ============================================================================

/// `level.elevation + lower_offset`; `None` when the level does not exist
pub fn base_elevation(doc: &Document, space: &Space) -> Option<f64> {
    let level = doc.level(space.level)?;
    Some(level.elevation + space.lower_offset.unwrap_or(0.0))
}

// ============================================================================
// 2. Upper bound
// ============================================================================

/// Where the upper elevation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperSource {
    /// Explicit upper limit level plus offset
    UpperLevel,
    /// Reference level plus unbounded height
    Unbounded,
}

/// Nominal top of a space and the probe reach derived from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpperBound {
    pub elevation: f64,
    pub max_search_distance: f64,
    pub source: UpperSource,
}

/// Resolve the upper bound of `space` above `base`. `margin` is in internal
/// units. `None` when the space's own level is missing; an upper level id
/// that does not resolve falls back to the unbounded height.
pub fn upper_bound(doc: &Document, space: &Space, base: f64, margin: f64) -> Option<UpperBound> {
    let upper_level = space.upper_level.and_then(|id| doc.level(id));
    let (elevation, source) = match upper_level {
        Some(level) => (
            level.elevation + space.upper_offset.unwrap_or(0.0),
            UpperSource::UpperLevel,
        ),
        None => {
            let level = doc.level(space.level)?;
            (level.elevation + space.unbounded_height, UpperSource::Unbounded)
        }
    };
    Some(UpperBound {
        elevation,
        max_search_distance: max_search_distance(elevation, base, margin),
        source,
    })
}

/// Probe reach: nominal height plus margin. Monotone in `upper - base`.
pub fn max_search_distance(upper: f64, base: f64, margin: f64) -> f64 {
    (upper - base) + margin
}
