//! # Door Updater
//!
//! Keeps door attributes in step with their surroundings. Fires on placed
//! or changed doors, and on changed walls (refreshing every door the wall
//! hosts).
//!
//! ## Table of Contents
//! 1. DoorUpdater
//! 2. Registration helpers

use std::collections::BTreeSet;

use headroom_model::{Category, ChangeEvent, ChangeKind, ElementId, MutationScope};
use tracing::debug;
use uuid::Uuid;

use crate::bus::{ChangePriority, Trigger, Updater, UpdaterContext, UpdaterId, UpdaterRegistry};
use crate::door::update_door;
use crate::error::Result;
use crate::options::DoorNumberOptions;

/// Fixed identity of the door updater
pub const DOOR_UPDATER_ID: UpdaterId = UpdaterId(Uuid::from_u128(0xA1B2C3D4_E5F6_7890_1234_56789ABCDEF0));

// ============================================================================
// 1. DoorUpdater
// ============================================================================

pub struct DoorUpdater {
    options: DoorNumberOptions,
}

impl DoorUpdater {
    pub fn new(options: DoorNumberOptions) -> Self {
        Self { options }
    }

    /// Doors added or modified, walls modified
    pub fn triggers() -> Vec<Trigger> {
        vec![
            Trigger::new(Category::Door, ChangeKind::Added),
            Trigger::new(Category::Door, ChangeKind::Modified),
            Trigger::new(Category::Wall, ChangeKind::Modified),
        ]
    }

    /// Doors affected by `events`, each once, in id order
    fn affected_doors(scope: &MutationScope<'_>, events: &[ChangeEvent]) -> BTreeSet<ElementId> {
        let doc = scope.document();
        let mut doors = BTreeSet::new();
        for event in events {
            match event.category {
                Category::Door => {
                    doors.insert(event.element);
                }
                Category::Wall => doors.extend(
                    doc.doors()
                        .iter()
                        .filter(|d| d.host_wall == Some(event.element))
                        .map(|d| d.id),
                ),
                _ => {}
            }
        }
        doors
    }
}

impl Updater for DoorUpdater {
    fn id(&self) -> UpdaterId {
        DOOR_UPDATER_ID
    }

    fn name(&self) -> &str {
        "Door attribute updater"
    }

    fn priority(&self) -> ChangePriority {
        ChangePriority::RoomsSpacesZones
    }

    fn execute(&self, scope: &mut MutationScope<'_>, events: &[ChangeEvent]) -> Result<()> {
        let doors = Self::affected_doors(scope, events);
        debug!(events = events.len(), doors = doors.len(), "Door updater running");
        for door in doors {
            update_door(scope, door, &self.options)?;
        }
        Ok(())
    }
}

// ============================================================================
// 2. Registration helpers
// ============================================================================

/// Bring the registry in line with `ctx`: register the door updater when
/// updates are on, unregister it when they are off. Returns whether it is
/// registered afterwards.
pub fn sync_door_updater(registry: &mut UpdaterRegistry, ctx: &UpdaterContext, options: &DoorNumberOptions) -> Result<bool> {
    if !ctx.is_enabled() {
        registry.unregister(DOOR_UPDATER_ID);
        return Ok(false);
    }
    if registry.is_registered(DOOR_UPDATER_ID) {
        registry.unregister(DOOR_UPDATER_ID);
    }
    registry.register(Box::new(DoorUpdater::new(options.clone())), DoorUpdater::triggers(), ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use headroom_model::{Attribute, Document, Door, Level, Space, StorageKind, Wall};

    fn model() -> Document {
        let mut doc = Document::new("Updater");
        doc.insert_level(Level { id: ElementId(1), name: "EG".into(), elevation: 0.0 }).unwrap();
        let mut room = Space::new(ElementId(10), "Küche", ElementId(1));
        room.number = "0.05".into();
        doc.insert_space(room).unwrap();
        doc.insert_wall(Wall::new(ElementId(30), "AW", "Beton")).unwrap();
        doc.insert_wall(Wall::new(ElementId(31), "IW", "Gips")).unwrap();

        let mut scope = MutationScope::open(&mut doc, "setup");
        for name in ["InRaum_Name", "InRaum_Nummer", "KAI_TUE_Wandmaterial", "KAI_TUE_Nummer"] {
            scope.bind_attribute(name, StorageKind::Text, Category::Door).unwrap();
        }
        scope.commit();

        for (id, wall) in [(40, 30), (41, 30), (42, 31)] {
            let mut door = Door::new(ElementId(id), format!("T{}", id));
            door.to_room = Some(ElementId(10));
            door.host_wall = Some(ElementId(wall));
            doc.insert_door(door).unwrap();
        }
        doc
    }

    fn registry() -> (UpdaterRegistry, UpdaterContext) {
        let ctx = UpdaterContext::default();
        let mut registry = UpdaterRegistry::new();
        assert!(sync_door_updater(&mut registry, &ctx, &DoorNumberOptions::default()).unwrap());
        (registry, ctx)
    }

    #[test]
    fn test_wall_change_refreshes_hosted_doors() {
        let mut doc = model();
        let (registry, ctx) = registry();
        let mut scope = MutationScope::open(&mut doc, "edit wall");
        scope.set_wall_material(ElementId(30), "Stahlbeton").unwrap();
        let events = scope.take_pending();
        assert_eq!(registry.dispatch(&mut scope, &events, &ctx).unwrap(), 1);
        scope.commit();

        let material = |id| doc.door(ElementId(id)).unwrap().attributes.text("KAI_TUE_Wandmaterial");
        assert_eq!(material(40), Some("Stahlbeton"));
        assert_eq!(material(41), Some("Stahlbeton"));
        assert_eq!(material(42), None);
    }

    #[test]
    fn test_added_door_is_filled() {
        let mut doc = model();
        let (registry, ctx) = registry();
        let mut scope = MutationScope::open(&mut doc, "place");
        let mut door = Door::new(ElementId(43), "T43");
        door.to_room = Some(ElementId(10));
        door.host_wall = Some(ElementId(31));
        door.attributes.insert("Extra", Attribute::with_value("x"));
        scope.add_door(door).unwrap();
        let events = scope.take_pending();
        registry.dispatch(&mut scope, &events, &ctx).unwrap();
        scope.commit();

        let attrs = &doc.door(ElementId(43)).unwrap().attributes;
        assert_eq!(attrs.text("InRaum_Name"), Some("Küche"));
        assert_eq!(attrs.text("KAI_TUE_Nummer"), Some("0.05"));
        assert_eq!(attrs.text("KAI_TUE_Wandmaterial"), Some("Gips"));
    }

    #[test]
    fn test_sync_follows_context() {
        let mut ctx = UpdaterContext::default();
        let mut registry = UpdaterRegistry::new();
        let options = DoorNumberOptions::default();
        assert!(sync_door_updater(&mut registry, &ctx, &options).unwrap());
        assert!(sync_door_updater(&mut registry, &ctx, &options).unwrap());
        assert_eq!(registry.len(), 1);
        ctx.toggle();
        assert!(!sync_door_updater(&mut registry, &ctx, &options).unwrap());
        assert!(registry.is_empty());
    }
}
