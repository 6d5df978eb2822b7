//! Vertical probe seam. The engine only needs "hits above this point,
//! nearest first"; `SurfaceIndex` is the production answer.

use glam::DVec3;
use headroom_model::{Hit, SurfaceIndex};

/// Upward ray query against the probed surfaces of one scene
pub trait SurfaceQuery {
    /// Hits with `0 <= proximity <= max_distance`, ascending by proximity
    fn cast_up(&self, origin: DVec3, max_distance: f64) -> Vec<Hit>;
}

impl SurfaceQuery for SurfaceIndex {
    fn cast_up(&self, origin: DVec3, max_distance: f64) -> Vec<Hit> {
        SurfaceIndex::cast_up(self, origin, max_distance)
    }
}
