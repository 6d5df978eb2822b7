//! # Surface Index
//!
//! R-tree over the plan footprints of horizontal surfaces, answering the
//! vertical probe: which surfaces does an upward ray from a point meet, and
//! how far up?
//!
//! The index is built per run from one view. Surfaces hidden in that view
//! are left out; hits outside the view's section box are dropped.
//!
//! ## Table of Contents
//! 1. SurfaceIndex
//! 2. IndexedSurface — R-tree entry
//! 3. Hit

use glam::{DVec2, DVec3};
use rstar::{RTree, RTreeObject, AABB};
use tracing::debug;

use crate::document::Document;
use crate::element::{Category, ElementId, Surface};
use crate::geometry::{footprint_contains, BoundingEnvelope, GEOMETRY_EPSILON};
use crate::view::View;

// ============================================================================
// 1. SurfaceIndex
// ============================================================================

/// Footprint index of one surface category as seen in one view
pub struct SurfaceIndex {
    tree: RTree<IndexedSurface>,
    section_box: Option<BoundingEnvelope>,
}

impl SurfaceIndex {
    /// Bulk-load every visible surface of `category` in `view`
    pub fn build(doc: &Document, view: &View, category: Category) -> Self {
        let entries: Vec<IndexedSurface> = doc
            .surfaces_of(category)
            .filter(|s| !view.is_hidden(s.id))
            .filter_map(IndexedSurface::from_surface)
            .collect();
        debug!(
            view = %view.name,
            category = %category,
            surfaces = entries.len(),
            "Surface index built"
        );
        Self {
            tree: RTree::bulk_load(entries),
            section_box: view.section_box,
        }
    }

    /// Cast a ray from `origin` straight up. Returns every surface face met
    /// within `max_distance`, nearest first; equal distances are ordered by
    /// element id.
    pub fn cast_up(&self, origin: DVec3, max_distance: f64) -> Vec<Hit> {
        if !origin.is_finite() || !max_distance.is_finite() || max_distance < 0.0 {
            return Vec::new();
        }

        let probe = AABB::from_point([origin.x, origin.y]);
        let mut hits: Vec<Hit> = self
            .tree
            .locate_in_envelope_intersecting(&probe)
            .filter(|entry| footprint_contains(&entry.footprint, DVec2::new(origin.x, origin.y)))
            .filter_map(|entry| {
                let z = entry.face_above(origin.z)?;
                let proximity = z - origin.z;
                if proximity > max_distance {
                    return None;
                }
                if let Some(section) = &self.section_box {
                    if !section.contains(DVec3::new(origin.x, origin.y, z)) {
                        return None;
                    }
                }
                Some(Hit {
                    surface: entry.id,
                    proximity,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.proximity
                .total_cmp(&b.proximity)
                .then(a.surface.cmp(&b.surface))
        });
        hits
    }

    /// Number of indexed surfaces
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

// ============================================================================
// 2. IndexedSurface — R-tree entry
// ============================================================================

struct IndexedSurface {
    id: ElementId,
    footprint: Vec<DVec2>,
    bottom: f64,
    top: f64,
    min: [f64; 2],
    max: [f64; 2],
}

impl IndexedSurface {
    fn from_surface(surface: &Surface) -> Option<Self> {
        let envelope = surface.envelope()?;
        Some(Self {
            id: surface.id,
            footprint: surface.footprint.clone(),
            bottom: surface.bottom.min(surface.top),
            top: surface.bottom.max(surface.top),
            min: [envelope.min.x, envelope.min.y],
            max: [envelope.max.x, envelope.max.y],
        })
    }

    /// First face an upward ray from `z` enters: the underside, or the top
    /// when the ray starts inside the slab.
    fn face_above(&self, z: f64) -> Option<f64> {
        if self.bottom >= z - GEOMETRY_EPSILON {
            Some(self.bottom.max(z))
        } else if self.top >= z - GEOMETRY_EPSILON {
            Some(self.top.max(z))
        } else {
            None
        }
    }
}

impl RTreeObject for IndexedSurface {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

// ============================================================================
// 3. Hit
// ============================================================================

/// A surface met by the vertical probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub surface: ElementId,
    /// Distance from the ray origin to the face, in internal units
    pub proximity: f64,
}
