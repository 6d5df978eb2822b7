//! Per-run record of spaces that were skipped or left without a clearance

use headroom_model::{ElementId, Space};
use tracing::warn;

/// Why a space is listed in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyReason {
    /// No finite placement point to probe from
    NoValidPosition,
    /// Reference level missing from the model
    NoValidLevel,
    /// Computed clearance was zero or negative; not written
    NonPositiveClearance,
}

impl std::fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyReason::NoValidPosition => f.write_str("no valid position"),
            AnomalyReason::NoValidLevel => f.write_str("no valid level"),
            AnomalyReason::NonPositiveClearance => f.write_str("clearance ≤ 0"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub space: ElementId,
    pub space_name: String,
    pub reason: AnomalyReason,
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.space_name, self.space, self.reason)
    }
}

/// Ordered anomaly list for one run
#[derive(Debug, Default)]
pub struct AnomalyCollector {
    entries: Vec<Anomaly>,
}

impl AnomalyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, space: &Space, reason: AnomalyReason) {
        warn!(space = %space.id, name = %space.name, reason = %reason, "Space flagged");
        self.entries.push(Anomaly {
            space: space.id,
            space_name: space.name.clone(),
            reason,
        });
    }

    pub fn contains(&self, space: ElementId) -> bool {
        self.entries.iter().any(|a| a.space == space)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Anomaly> {
        self.entries
    }
}
