//! # Clearance Command
//!
//! The whole run: precondition check, one mutation scope, the per-space
//! pipeline, commit, report.
//!
//! ## Table of Contents
//! 1. RunMode / ClearanceReport
//! 2. run_clearance
//! 3. Per-space pipeline

use chrono::{DateTime, Utc};
use glam::DVec3;
use headroom_model::{CommandOutcome, Document, MutationScope, Space, SurfaceIndex, View};
use tracing::{debug, error, info};

use crate::anomaly::{Anomaly, AnomalyCollector, AnomalyReason};
use crate::calculator::calculate;
use crate::config::ClearanceConfig;
use crate::elevation::{base_elevation, upper_bound};
use crate::enumerate::enumerate_spaces;
use crate::error::{ClearanceError, Result};
use crate::probe::SurfaceQuery;
use crate::writer::AttributeWriter;

/// Mutation scope name for a clearance run
pub const SCOPE_NAME: &str = "Calculate clearance";

// ============================================================================
// 1. RunMode / ClearanceReport
// ============================================================================

/// Whether a run keeps its edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Commit,
    /// Compute and report, then roll back
    DryRun,
}

/// End-of-run summary handed to the invoking layer
#[derive(Debug, Clone)]
pub struct ClearanceReport {
    /// Spaces in the model
    pub processed: usize,
    /// Spaces whose clearance attribute was written
    pub written: usize,
    pub anomalies: Vec<Anomaly>,
    pub mode: RunMode,
    pub finished_at: DateTime<Utc>,
}

impl ClearanceReport {
    /// Single user-facing text: summary line, then one line per anomaly
    pub fn message(&self) -> String {
        let mut out = format!(
            "Clearance calculated for {} of {} space(s).",
            self.written, self.processed
        );
        if self.mode == RunMode::DryRun {
            out.push_str(" Dry run: no changes kept.");
        }
        if !self.anomalies.is_empty() {
            out.push_str(&format!("\n{} space(s) need attention:", self.anomalies.len()));
            for anomaly in &self.anomalies {
                out.push_str("\n  • ");
                out.push_str(&anomaly.to_string());
            }
        }
        out
    }
}

// ============================================================================
// 2. run_clearance
// ============================================================================

/// Calculate and write clearance for every space of `doc`
pub fn run_clearance(doc: &mut Document, config: &ClearanceConfig) -> CommandOutcome<ClearanceReport> {
    run(doc, config, RunMode::Commit)
}

/// `run_clearance` with an explicit mode. Builds the footprint index from
/// the active 3D view.
pub fn run(doc: &mut Document, config: &ClearanceConfig, mode: RunMode) -> CommandOutcome<ClearanceReport> {
    let Some(view) = doc.active_view_3d().cloned() else {
        let err = ClearanceError::NoActive3dView;
        error!(error = %err, "Clearance run aborted");
        return CommandOutcome::Failed(err.to_string());
    };
    let index = SurfaceIndex::build(doc, &view, config.surface_category);
    run_with_query(doc, config, &view, &index, mode)
}

/// Run against a caller-supplied probe
pub fn run_with_query(
    doc: &mut Document,
    config: &ClearanceConfig,
    view: &View,
    query: &dyn SurfaceQuery,
    mode: RunMode,
) -> CommandOutcome<ClearanceReport> {
    info!(view = %view.name, mode = ?mode, "Clearance run started");

    let processed = doc.spaces().len();
    let mut scope = MutationScope::open(doc, SCOPE_NAME);
    let mut anomalies = AnomalyCollector::new();

    let written = match process_all(&mut scope, config, view, query, &mut anomalies) {
        Ok(written) => written,
        Err(err) => {
            error!(error = %err, "Clearance run failed; rolled back");
            scope.rollback();
            return CommandOutcome::Failed(err.to_string());
        }
    };

    match mode {
        RunMode::Commit => {
            scope.commit();
        }
        RunMode::DryRun => scope.rollback(),
    }

    let report = ClearanceReport {
        processed,
        written,
        anomalies: anomalies.into_vec(),
        mode,
        finished_at: Utc::now(),
    };
    info!(
        processed = report.processed,
        written = report.written,
        anomalies = report.anomalies.len(),
        "Clearance run finished"
    );
    CommandOutcome::Succeeded(report)
}

// ============================================================================
// 3. Per-space pipeline
// ============================================================================

fn process_all(
    scope: &mut MutationScope<'_>,
    config: &ClearanceConfig,
    view: &View,
    query: &dyn SurfaceQuery,
    anomalies: &mut AnomalyCollector,
) -> Result<usize> {
    let units = scope.document().units().clone();
    let pipeline = SpacePipeline {
        view,
        query,
        writer: AttributeWriter::new(&config.attributes, config.formatter(&units), units.internal),
        margin: config.margin_internal(&units),
    };

    // Candidates borrow the document; copy them out before editing
    let candidates: Vec<(Space, DVec3)> = enumerate_spaces(scope.document(), anomalies)
        .into_iter()
        .map(|c| (c.space.clone(), c.point))
        .collect();

    let mut written = 0;
    for (space, point) in &candidates {
        if pipeline.process(scope, anomalies, space, *point)? {
            written += 1;
        }
    }
    Ok(written)
}

struct SpacePipeline<'r> {
    view: &'r View,
    query: &'r dyn SurfaceQuery,
    writer: AttributeWriter<'r>,
    /// Search margin in internal units
    margin: f64,
}

impl SpacePipeline<'_> {
    /// Resolve, probe, calculate and write one space. Returns whether the
    /// clearance attribute was written.
    fn process(
        &self,
        scope: &mut MutationScope<'_>,
        anomalies: &mut AnomalyCollector,
        space: &Space,
        point: DVec3,
    ) -> Result<bool> {
        let doc = scope.document();
        let Some(base) = base_elevation(doc, space) else {
            anomalies.record(space, AnomalyReason::NoValidLevel);
            return Ok(false);
        };
        let Some(upper) = upper_bound(doc, space, base, self.margin) else {
            anomalies.record(space, AnomalyReason::NoValidLevel);
            return Ok(false);
        };

        let origin = DVec3::new(point.x, point.y, base);
        let hits = self.query.cast_up(origin, upper.max_search_distance);
        let clearance = calculate(doc, self.view, &hits, base, &upper);
        debug!(
            space = %space.id,
            base,
            upper = upper.elevation,
            reach = upper.max_search_distance,
            hits = hits.len(),
            clearance = clearance.value,
            branch = ?clearance.branch,
            "Space resolved"
        );

        self.writer.reset_texts(scope, space.id)?;
        self.writer.write_floor_elevation(scope, space.id, base)?;
        if let Some(bottom) = clearance.ceiling_bottom {
            self.writer.write_ceiling_bottom(scope, space.id, bottom)?;
        }

        if !clearance.is_positive() {
            anomalies.record(space, AnomalyReason::NonPositiveClearance);
            return Ok(false);
        }
        Ok(self.writer.write_clearance(scope, space.id, clearance.value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use headroom_model::{
        Attribute, Category, ElementId, Hit, LengthUnit, Level, ProjectUnits, StorageKind, Surface,
    };

    const CLEARANCE: &str = "KAI_GEO_Lichte_Höhe";
    const FLOOR: &str = "KAI_GEO_Höhe_FBOK";
    const CEILING: &str = "KAI_GEO_Höhe_UK_Decke";

    fn room(id: u64, name: &str, location: Option<DVec3>) -> Space {
        let mut space = Space::new(ElementId(id), name, ElementId(1));
        space.unbounded_height = 3.0;
        space.location = location;
        space.attributes.insert(CLEARANCE, Attribute::empty(StorageKind::Number));
        space.attributes.insert(FLOOR, Attribute::with_value("stale"));
        space.attributes.insert(CEILING, Attribute::with_value("stale"));
        space
    }

    fn ceiling(id: u64, bottom: f64) -> Surface {
        let footprint = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ];
        Surface::new(ElementId(id), Category::Ceiling, footprint, bottom, bottom + 0.2)
    }

    /// One level at 0, one room at (5, 5) and an active 3D view
    fn model(ceilings: &[Surface]) -> Document {
        let mut doc = Document::new("Clearance");
        doc.insert_level(Level { id: ElementId(1), name: "EG".into(), elevation: 0.0 }).unwrap();
        doc.insert_space(room(10, "Office", Some(DVec3::new(5.0, 5.0, 0.0)))).unwrap();
        for c in ceilings {
            doc.insert_surface(c.clone()).unwrap();
        }
        doc.insert_view(View::three_d(ElementId(90), "{3D}")).unwrap();
        doc.set_active_view(Some(ElementId(90))).unwrap();
        doc
    }

    fn report(outcome: CommandOutcome<ClearanceReport>) -> ClearanceReport {
        match outcome {
            CommandOutcome::Succeeded(report) => report,
            other => panic!("expected success, got {:?}", other),
        }
    }

    fn attrs(doc: &Document, id: u64) -> &headroom_model::AttributeSet {
        &doc.space(ElementId(id)).unwrap().attributes
    }

    #[test]
    fn test_no_ceiling_uses_unbounded_height() {
        let mut doc = model(&[]);
        let report = report(run_clearance(&mut doc, &ClearanceConfig::default()));
        assert_eq!(report.written, 1);
        assert!(report.anomalies.is_empty());
        assert_eq!(attrs(&doc, 10).number(CLEARANCE), Some(3.0));
        assert_eq!(attrs(&doc, 10).text(FLOOR), Some("0.00 m"));
        assert_eq!(attrs(&doc, 10).text(CEILING), Some(""));
    }

    #[test]
    fn test_ceiling_in_range() {
        let mut doc = model(&[ceiling(20, 2.5)]);
        report(run_clearance(&mut doc, &ClearanceConfig::default()));
        assert_eq!(attrs(&doc, 10).number(CLEARANCE), Some(2.5));
        assert_eq!(attrs(&doc, 10).text(CEILING), Some("2.50 m"));
    }

    #[test]
    fn test_ceiling_at_floor_is_flagged() {
        let mut doc = model(&[ceiling(20, 0.0)]);
        let report = report(run_clearance(&mut doc, &ClearanceConfig::default()));
        assert_eq!(report.written, 0);
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].reason, AnomalyReason::NonPositiveClearance);
        assert_eq!(attrs(&doc, 10).number(CLEARANCE), None);
        assert!(report.message().contains("Office (#10): clearance ≤ 0"));
    }

    #[test]
    fn test_space_without_position_is_untouched() {
        let mut doc = model(&[]);
        doc.insert_space(room(11, "Shaft", None)).unwrap();
        let before = attrs(&doc, 11).clone();
        let report = report(run_clearance(&mut doc, &ClearanceConfig::default()));
        assert_eq!(report.processed, 2);
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].reason, AnomalyReason::NoValidPosition);
        assert_eq!(attrs(&doc, 11), &before);
        assert!(report.message().contains("Shaft (#11): no valid position"));
    }

    #[test]
    fn test_ceiling_beyond_reach_is_ignored() {
        let mut doc = model(&[ceiling(20, 4.5)]);
        report(run_clearance(&mut doc, &ClearanceConfig::default()));
        assert_eq!(attrs(&doc, 10).number(CLEARANCE), Some(3.0));
        assert_eq!(attrs(&doc, 10).text(CEILING), Some(""));
    }

    #[test]
    fn test_ceiling_just_above_nominal_bound_counts() {
        let mut doc = model(&[ceiling(20, 3.4)]);
        report(run_clearance(&mut doc, &ClearanceConfig::default()));
        let value = attrs(&doc, 10).number(CLEARANCE).unwrap();
        assert!((value - 3.4).abs() < 1e-9);
    }

    #[test]
    fn test_no_active_view_fails_before_editing() {
        let mut doc = model(&[]);
        doc.set_active_view(None).unwrap();
        let before = doc.clone();
        match run_clearance(&mut doc, &ClearanceConfig::default()) {
            CommandOutcome::Failed(message) => assert!(message.contains("3D view")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(doc.to_json_string().unwrap(), before.to_json_string().unwrap());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut doc = model(&[ceiling(20, 2.5)]);
        report(run_clearance(&mut doc, &ClearanceConfig::default()));
        let first = doc.to_json_string().unwrap();
        report(run_clearance(&mut doc, &ClearanceConfig::default()));
        assert_eq!(doc.to_json_string().unwrap(), first);
    }

    #[test]
    fn test_stale_ceiling_text_is_cleared_on_fallback() {
        let mut doc = model(&[ceiling(20, 2.5)]);
        report(run_clearance(&mut doc, &ClearanceConfig::default()));
        assert_eq!(attrs(&doc, 10).text(CEILING), Some("2.50 m"));

        let mut view = doc.view(ElementId(90)).unwrap().clone();
        view.hidden.insert(ElementId(20));
        let index = SurfaceIndex::build(&doc, &view, Category::Ceiling);
        report(run_with_query(&mut doc, &ClearanceConfig::default(), &view, &index, RunMode::Commit));
        assert_eq!(attrs(&doc, 10).text(CEILING), Some(""));
        assert_eq!(attrs(&doc, 10).number(CLEARANCE), Some(3.0));
    }

    #[test]
    fn test_origin_comes_from_level_not_envelope() {
        let mut doc = Document::new("Offsets");
        doc.insert_level(Level { id: ElementId(1), name: "EG".into(), elevation: 1.0 }).unwrap();
        doc.insert_level(Level { id: ElementId(2), name: "OG".into(), elevation: 4.0 }).unwrap();
        let mut space = room(10, "Hall", Some(DVec3::new(5.0, 5.0, 99.0)));
        space.lower_offset = Some(0.2);
        space.upper_level = Some(ElementId(2));
        space.upper_offset = Some(-0.5);
        space.envelope = Some(headroom_model::BoundingEnvelope::new(
            DVec3::new(0.0, 0.0, -5.0),
            DVec3::new(10.0, 10.0, 20.0),
        ));
        doc.insert_space(space).unwrap();
        doc.insert_view(View::three_d(ElementId(90), "{3D}")).unwrap();
        doc.set_active_view(Some(ElementId(90))).unwrap();

        report(run_clearance(&mut doc, &ClearanceConfig::default()));
        let value = attrs(&doc, 10).number(CLEARANCE).unwrap();
        assert!((value - 2.3).abs() < 1e-9);
        assert_eq!(attrs(&doc, 10).text(FLOOR), Some("1.20 m"));
    }

    #[test]
    fn test_feet_internal_units() {
        let mut doc = Document::new("Imperial").with_units(ProjectUnits {
            internal: LengthUnit::Feet,
            ..Default::default()
        });
        doc.insert_level(Level { id: ElementId(1), name: "L1".into(), elevation: 0.0 }).unwrap();
        let mut space = room(10, "Lobby", Some(DVec3::new(5.0, 5.0, 0.0)));
        space.unbounded_height = 10.0;
        doc.insert_space(space).unwrap();
        // 3 ft above nominal: inside a 1 m (3.28 ft) margin
        doc.insert_surface(ceiling(20, 13.0)).unwrap();
        doc.insert_view(View::three_d(ElementId(90), "{3D}")).unwrap();
        doc.set_active_view(Some(ElementId(90))).unwrap();

        report(run_clearance(&mut doc, &ClearanceConfig::default()));
        assert_eq!(attrs(&doc, 10).number(CLEARANCE), Some(13.0));
        assert_eq!(attrs(&doc, 10).text(CEILING), Some("3.96 m"));
    }

    #[test]
    fn test_dry_run_keeps_nothing() {
        let mut doc = model(&[ceiling(20, 2.5)]);
        let before = doc.to_json_string().unwrap();
        let report = report(run(&mut doc, &ClearanceConfig::default(), RunMode::DryRun));
        assert_eq!(report.written, 1);
        assert!(report.message().contains("Dry run"));
        assert_eq!(doc.to_json_string().unwrap(), before);
    }

    fn ceiling_at(id: u64, x0: f64, bottom: f64) -> Surface {
        let footprint = vec![
            DVec2::new(x0, 0.0),
            DVec2::new(x0 + 10.0, 0.0),
            DVec2::new(x0 + 10.0, 10.0),
            DVec2::new(x0, 10.0),
        ];
        Surface::new(ElementId(id), Category::Ceiling, footprint, bottom, bottom + 0.2)
    }

    #[test]
    fn test_mixed_model_in_one_run() {
        let mut doc = model(&[ceiling_at(20, 0.0, 2.5), ceiling_at(22, 40.0, 0.0)]);
        doc.insert_space(room(11, "Corridor", Some(DVec3::new(25.0, 5.0, 0.0)))).unwrap();
        doc.insert_space(room(12, "Pit", Some(DVec3::new(45.0, 5.0, 0.0)))).unwrap();
        doc.insert_space(room(13, "Shaft", None)).unwrap();
        let mut locked = room(14, "Archive", Some(DVec3::new(65.0, 5.0, 0.0)));
        locked.attributes.insert(CLEARANCE, Attribute::with_value(9.0).read_only());
        doc.insert_space(locked).unwrap();

        let report = report(run_clearance(&mut doc, &ClearanceConfig::default()));
        assert_eq!(report.processed, 5);
        assert_eq!(report.written, 2);

        assert_eq!(attrs(&doc, 10).number(CLEARANCE), Some(2.5));
        assert_eq!(attrs(&doc, 11).number(CLEARANCE), Some(3.0));
        assert_eq!(attrs(&doc, 11).text(CEILING), Some(""));
        assert_eq!(attrs(&doc, 12).number(CLEARANCE), None);
        assert_eq!(attrs(&doc, 14).number(CLEARANCE), Some(9.0));

        let reasons: Vec<_> = report.anomalies.iter().map(|a| (a.space, a.reason)).collect();
        assert_eq!(reasons.len(), 2);
        assert!(reasons.contains(&(ElementId(12), AnomalyReason::NonPositiveClearance)));
        assert!(reasons.contains(&(ElementId(13), AnomalyReason::NoValidPosition)));
    }

    struct Scripted(Vec<Hit>);

    impl SurfaceQuery for Scripted {
        fn cast_up(&self, _origin: DVec3, max_distance: f64) -> Vec<Hit> {
            self.0.iter().copied().filter(|h| h.proximity <= max_distance).collect()
        }
    }

    #[test]
    fn test_first_hit_wins() {
        let mut doc = model(&[ceiling(20, 2.5), ceiling(21, 2.8)]);
        let view = doc.view(ElementId(90)).unwrap().clone();
        let query = Scripted(vec![
            Hit { surface: ElementId(21), proximity: 2.8 },
            Hit { surface: ElementId(20), proximity: 2.5 },
        ]);
        report(run_with_query(&mut doc, &ClearanceConfig::default(), &view, &query, RunMode::Commit));
        let value = attrs(&doc, 10).number(CLEARANCE).unwrap();
        assert!((value - 2.8).abs() < 1e-9);
    }
}
