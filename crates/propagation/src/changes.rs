//! # Change Sets
//!
//! A JSON list of model edits applied as one mutation scope. The resulting
//! change events go through the updater bus before commit, so updater
//! writes land in the same batch.
//!
//! ```json
//! [
//!   { "op": "set_wall_material", "wall": 30, "material": "Beton" },
//!   { "op": "set_door_rooms", "door": 40, "from_room": 10, "to_room": 11 },
//!   { "op": "move_door", "door": 40, "location": [1.0, 2.0, 0.0], "host_wall": 31 }
//! ]
//! ```
//!
//! ## Table of Contents
//! 1. Edit / ChangeSet
//! 2. apply_changes

use std::path::Path;

use glam::DVec3;
use headroom_model::{AttributeValue, CommandOutcome, Document, Door, ElementId, MutationScope};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::bus::{UpdaterContext, UpdaterRegistry};
use crate::error::{PropagationError, Result};

// ============================================================================
// 1. Edit / ChangeSet
// ============================================================================

/// One model edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    AddDoor {
        door: Door,
    },
    SetDoorRooms {
        door: ElementId,
        #[serde(default)]
        from_room: Option<ElementId>,
        #[serde(default)]
        to_room: Option<ElementId>,
    },
    MoveDoor {
        door: ElementId,
        location: DVec3,
        #[serde(default)]
        host_wall: Option<ElementId>,
    },
    SetWallMaterial {
        wall: ElementId,
        material: String,
    },
    SetAttribute {
        element: ElementId,
        name: String,
        value: AttributeValue,
    },
}

impl Edit {
    fn apply(&self, scope: &mut MutationScope<'_>) -> Result<()> {
        match self {
            Edit::AddDoor { door } => scope.add_door(door.clone())?,
            Edit::SetDoorRooms { door, from_room, to_room } => scope.set_door_rooms(*door, *from_room, *to_room)?,
            Edit::MoveDoor { door, location, host_wall } => scope.move_door(*door, *location, *host_wall)?,
            Edit::SetWallMaterial { wall, material } => scope.set_wall_material(*wall, material.as_str())?,
            Edit::SetAttribute { element, name, value } => {
                scope.set_attribute(*element, name, value.clone())?;
            }
        }
        Ok(())
    }
}

/// Ordered list of edits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    pub edits: Vec<Edit>,
}

impl ChangeSet {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PropagationError::io(path, e))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

// ============================================================================
// 2. apply_changes
// ============================================================================

/// Summary of an applied change set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub edits: usize,
    /// Events the edits produced
    pub events: usize,
    pub updaters_invoked: usize,
    /// Events in the committed journal, updater writes included
    pub committed_changes: usize,
}

impl ApplyReport {
    pub fn message(&self) -> String {
        format!(
            "Applied {} edit(s): {} change(s) committed, {} updater run(s).",
            self.edits, self.committed_changes, self.updaters_invoked
        )
    }
}

/// Apply `changes` in one scope, dispatch the resulting events, commit.
/// Any failing edit rolls the whole set back.
pub fn apply_changes(
    doc: &mut Document,
    changes: &ChangeSet,
    registry: &UpdaterRegistry,
    ctx: &UpdaterContext,
) -> CommandOutcome<ApplyReport> {
    let mut scope = MutationScope::open(doc, "Apply changes");
    match apply_in_scope(&mut scope, changes, registry, ctx) {
        Ok((events, updaters_invoked)) => {
            let committed_changes = scope.commit().len();
            let report = ApplyReport {
                edits: changes.edits.len(),
                events,
                updaters_invoked,
                committed_changes,
            };
            info!(
                edits = report.edits,
                events = report.events,
                updaters = report.updaters_invoked,
                "Change set applied"
            );
            CommandOutcome::Succeeded(report)
        }
        Err(err) => {
            error!(error = %err, "Change set failed; rolled back");
            scope.rollback();
            CommandOutcome::Failed(err.to_string())
        }
    }
}

fn apply_in_scope(
    scope: &mut MutationScope<'_>,
    changes: &ChangeSet,
    registry: &UpdaterRegistry,
    ctx: &UpdaterContext,
) -> Result<(usize, usize)> {
    for edit in &changes.edits {
        edit.apply(scope)?;
    }
    let events = scope.take_pending();
    let invoked = registry.dispatch(scope, &events, ctx)?;
    Ok((events.len(), invoked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DoorNumberOptions;
    use crate::updater::sync_door_updater;
    use headroom_model::{Category, Level, Space, StorageKind, Wall};

    fn model() -> Document {
        let mut doc = Document::new("Changes");
        doc.insert_level(Level { id: ElementId(1), name: "EG".into(), elevation: 0.0 }).unwrap();
        let mut a = Space::new(ElementId(10), "Flur", ElementId(1));
        a.number = "0.01".into();
        let mut b = Space::new(ElementId(11), "Bad", ElementId(1));
        b.number = "0.03".into();
        doc.insert_space(a).unwrap();
        doc.insert_space(b).unwrap();
        doc.insert_wall(Wall::new(ElementId(30), "IW", "Gips")).unwrap();
        let mut scope = MutationScope::open(&mut doc, "setup");
        for name in ["InRaum_Name", "AusRaum_Name", "KAI_TUE_Nummer", "KAI_TUE_Wandmaterial"] {
            scope.bind_attribute(name, StorageKind::Text, Category::Door).unwrap();
        }
        scope.commit();
        doc.insert_door(Door::new(ElementId(40), "T1")).unwrap();
        doc
    }

    fn bus(enabled: bool) -> (UpdaterRegistry, UpdaterContext) {
        let ctx = UpdaterContext::new(enabled);
        let mut registry = UpdaterRegistry::new();
        sync_door_updater(&mut registry, &ctx, &DoorNumberOptions::default()).unwrap();
        (registry, ctx)
    }

    #[test]
    fn test_parse_change_set() {
        let set = ChangeSet::from_json_str(
            r#"[
                { "op": "set_wall_material", "wall": 30, "material": "Beton" },
                { "op": "move_door", "door": 40, "location": [1.0, 2.0, 0.0] },
                { "op": "set_attribute", "element": 40, "name": "Mark", "value": "b" }
            ]"#,
        )
        .unwrap();
        assert_eq!(set.edits.len(), 3);
        assert!(matches!(set.edits[1], Edit::MoveDoor { host_wall: None, .. }));
    }

    #[test]
    fn test_updater_writes_commit_with_edits() {
        let mut doc = model();
        let (registry, ctx) = bus(true);
        let set = ChangeSet::from_json_str(
            r#"[
                { "op": "set_door_rooms", "door": 40, "from_room": 10, "to_room": 11 },
                { "op": "move_door", "door": 40, "location": [1.0, 0.0, 0.0], "host_wall": 30 }
            ]"#,
        )
        .unwrap();
        let report = apply_changes(&mut doc, &set, &registry, &ctx).succeeded().unwrap();
        assert_eq!(report.events, 2);
        assert_eq!(report.updaters_invoked, 1);
        assert!(report.committed_changes > report.events);

        let attrs = &doc.door(ElementId(40)).unwrap().attributes;
        assert_eq!(attrs.text("InRaum_Name"), Some("Bad"));
        assert_eq!(attrs.text("AusRaum_Name"), Some("Flur"));
        assert_eq!(attrs.text("KAI_TUE_Nummer"), Some("0.03"));
        assert_eq!(attrs.text("KAI_TUE_Wandmaterial"), Some("Gips"));
    }

    #[test]
    fn test_disabled_updates_only_apply_edits() {
        let mut doc = model();
        let (registry, ctx) = bus(false);
        let set = ChangeSet {
            edits: vec![Edit::SetDoorRooms {
                door: ElementId(40),
                from_room: None,
                to_room: Some(ElementId(11)),
            }],
        };
        let report = apply_changes(&mut doc, &set, &registry, &ctx).succeeded().unwrap();
        assert_eq!(report.updaters_invoked, 0);
        assert_eq!(doc.door(ElementId(40)).unwrap().to_room, Some(ElementId(11)));
        assert_eq!(doc.door(ElementId(40)).unwrap().attributes.text("InRaum_Name"), None);
    }

    #[test]
    fn test_failing_edit_rolls_back_everything() {
        let mut doc = model();
        let (registry, ctx) = bus(true);
        let set = ChangeSet {
            edits: vec![
                Edit::SetWallMaterial {
                    wall: ElementId(30),
                    material: "Beton".into(),
                },
                Edit::SetDoorRooms {
                    door: ElementId(404),
                    from_room: None,
                    to_room: None,
                },
            ],
        };
        let outcome = apply_changes(&mut doc, &set, &registry, &ctx);
        assert!(matches!(outcome, CommandOutcome::Failed(_)));
        assert_eq!(doc.wall(ElementId(30)).unwrap().material, "Gips");
    }
}
