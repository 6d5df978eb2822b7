//! # Geometry
//!
//! Axis-aligned bounding envelopes and planar footprint tests.
//!
//! ## Table of Contents
//! 1. BoundingEnvelope
//! 2. Footprint tests

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Tolerance for on-edge footprint tests and coincident faces
pub const GEOMETRY_EPSILON: f64 = 1e-9;

// ============================================================================
// 1. BoundingEnvelope
// ============================================================================

/// Axis-aligned extent of an element, in internal units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingEnvelope {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingEnvelope {
    /// Create from two corners in any order
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Envelope of a footprint extruded between two elevations.
    /// Returns `None` for an empty footprint.
    pub fn from_footprint(footprint: &[DVec2], bottom: f64, top: f64) -> Option<Self> {
        let first = footprint.first()?;
        let (mut lo, mut hi) = (*first, *first);
        for p in &footprint[1..] {
            lo = lo.min(*p);
            hi = hi.max(*p);
        }
        Some(Self::new(
            DVec3::new(lo.x, lo.y, bottom.min(top)),
            DVec3::new(hi.x, hi.y, bottom.max(top)),
        ))
    }

    /// Lowest Z of the envelope
    pub fn min_z(&self) -> f64 {
        self.min.z
    }

    /// Whether `p` lies inside or on the boundary
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min - DVec3::splat(GEOMETRY_EPSILON)).all()
            && p.cmple(self.max + DVec3::splat(GEOMETRY_EPSILON)).all()
    }

    /// Overlap of two envelopes, `None` when they are disjoint
    pub fn intersection(&self, other: &BoundingEnvelope) -> Option<BoundingEnvelope> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.cmple(max).all() {
            Some(BoundingEnvelope { min, max })
        } else {
            None
        }
    }
}

// ============================================================================
// 2. Footprint tests
// ============================================================================

/// Even-odd point-in-polygon test. Points on an edge count as inside.
pub fn footprint_contains(polygon: &[DVec2], p: DVec2) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if on_segment(a, b, p) {
            return true;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_segment(a: DVec2, b: DVec2, p: DVec2) -> bool {
    let ab = b - a;
    let ap = p - a;
    if ab.perp_dot(ap).abs() > GEOMETRY_EPSILON * ab.length().max(1.0) {
        return false;
    }
    let t = ap.dot(ab);
    t >= -GEOMETRY_EPSILON && t <= ab.length_squared() + GEOMETRY_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(size, 0.0),
            DVec2::new(size, size),
            DVec2::new(0.0, size),
        ]
    }

    #[test]
    fn test_footprint_contains_interior_and_edge() {
        let sq = square(4.0);
        assert!(footprint_contains(&sq, DVec2::new(2.0, 2.0)));
        assert!(footprint_contains(&sq, DVec2::new(4.0, 1.0)));
        assert!(!footprint_contains(&sq, DVec2::new(4.5, 1.0)));
    }

    #[test]
    fn test_footprint_contains_concave() {
        // L-shape: notch at the upper right
        let l = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(4.0, 2.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(2.0, 4.0),
            DVec2::new(0.0, 4.0),
        ];
        assert!(footprint_contains(&l, DVec2::new(1.0, 3.0)));
        assert!(!footprint_contains(&l, DVec2::new(3.0, 3.0)));
    }

    #[test]
    fn test_envelope_from_footprint() {
        let env = BoundingEnvelope::from_footprint(&square(3.0), 2.6, 2.4).unwrap();
        assert_eq!(env.min, DVec3::new(0.0, 0.0, 2.4));
        assert_eq!(env.max, DVec3::new(3.0, 3.0, 2.6));
        assert!(BoundingEnvelope::from_footprint(&[], 0.0, 1.0).is_none());
    }

    #[test]
    fn test_envelope_intersection() {
        let a = BoundingEnvelope::new(DVec3::ZERO, DVec3::splat(2.0));
        let b = BoundingEnvelope::new(DVec3::splat(1.0), DVec3::splat(3.0));
        let c = BoundingEnvelope::new(DVec3::splat(5.0), DVec3::splat(6.0));
        assert_eq!(
            a.intersection(&b),
            Some(BoundingEnvelope::new(DVec3::splat(1.0), DVec3::splat(2.0)))
        );
        assert!(a.intersection(&c).is_none());
    }
}
