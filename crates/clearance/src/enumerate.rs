//! Candidate selection: every space with a usable reference point, in
//! element-id order. The rest go straight to the anomaly list.

use glam::DVec3;
use headroom_model::{Document, Space};
use tracing::debug;

use crate::anomaly::{AnomalyCollector, AnomalyReason};

/// A space the probe can run from
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'d> {
    pub space: &'d Space,
    /// Finite placement point; only X and Y feed the probe
    pub point: DVec3,
}

pub fn enumerate_spaces<'d>(doc: &'d Document, anomalies: &mut AnomalyCollector) -> Vec<Candidate<'d>> {
    let mut spaces: Vec<&Space> = doc.spaces().iter().collect();
    spaces.sort_by_key(|s| s.id);

    let mut candidates = Vec::with_capacity(spaces.len());
    for space in spaces {
        match space.reference_point() {
            Some(point) => candidates.push(Candidate { space, point }),
            None => anomalies.record(space, AnomalyReason::NoValidPosition),
        }
    }
    debug!(
        candidates = candidates.len(),
        skipped = anomalies.len(),
        "Spaces enumerated"
    );
    candidates
}
