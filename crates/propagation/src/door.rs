//! # Door Propagation
//!
//! Copies adjoining-room names and numbers, the host wall's material and a
//! composed door number onto door attributes. Every write is a text write
//! through the tri-state capability; attributes a door lacks are skipped.
//!
//! ## Table of Contents
//! 1. Attribute names / DoorContext
//! 2. update_door
//! 3. Batch commands
//! 4. Preview

use headroom_model::{Capability, CommandOutcome, Document, Door, ElementId, MutationScope};
use tracing::{debug, error, info};

use crate::error::Result;
use crate::number::compose_door_number;
use crate::options::DoorNumberOptions;

// ============================================================================
// 1. Attribute names / DoorContext
// ============================================================================

pub const FROM_ROOM_NAME: &str = "AusRaum_Name";
pub const FROM_ROOM_NUMBER: &str = "AusRaum_Nummer";
pub const TO_ROOM_NAME: &str = "InRaum_Name";
pub const TO_ROOM_NUMBER: &str = "InRaum_Nummer";
pub const WALL_MATERIAL: &str = "KAI_TUE_Wandmaterial";

/// Strings a door takes from its surroundings. Missing rooms or walls give
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoorContext {
    pub from_name: String,
    pub from_number: String,
    pub to_name: String,
    pub to_number: String,
    pub wall_material: String,
    /// Value of the configured extra attribute on the door itself
    pub extra: String,
}

impl DoorContext {
    pub fn gather(doc: &Document, door: &Door, options: &DoorNumberOptions) -> Self {
        let room = |id: Option<ElementId>| {
            id.and_then(|id| doc.space(id))
                .map(|s| (s.name.clone(), s.number.clone()))
                .unwrap_or_default()
        };
        let (from_name, from_number) = room(door.from_room);
        let (to_name, to_number) = room(door.to_room);
        let wall_material = door
            .host_wall
            .and_then(|id| doc.wall(id))
            .map(|w| w.material.clone())
            .unwrap_or_default();
        let extra = if options.extra_attribute.trim().is_empty() {
            String::new()
        } else {
            door.attributes
                .text(&options.extra_attribute)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            from_name,
            from_number,
            to_name,
            to_number,
            wall_material,
            extra,
        }
    }

    pub fn door_number(&self, options: &DoorNumberOptions) -> String {
        compose_door_number(&self.to_number, &self.from_number, &self.extra, &options.separator)
    }
}

// ============================================================================
// 2. update_door
// ============================================================================

/// Refresh every propagated attribute of one door
pub fn update_door(scope: &mut MutationScope<'_>, door: ElementId, options: &DoorNumberOptions) -> Result<()> {
    let doc = scope.document();
    let Some(element) = doc.door(door) else {
        return Err(headroom_model::ModelError::ElementNotFound(door).into());
    };
    let context = DoorContext::gather(doc, element, options);
    let number = context.door_number(options);

    let writes = [
        (FROM_ROOM_NAME, context.from_name),
        (FROM_ROOM_NUMBER, context.from_number),
        (TO_ROOM_NAME, context.to_name),
        (TO_ROOM_NUMBER, context.to_number),
        (WALL_MATERIAL, context.wall_material),
        (options.number_attribute.as_str(), number),
    ];
    for (name, value) in writes {
        let capability = scope.set_attribute(door, name, value)?;
        if capability != Capability::Writable {
            debug!(door = %door, attribute = name, capability = %capability, "Door attribute skipped");
        }
    }
    Ok(())
}

// ============================================================================
// 3. Batch commands
// ============================================================================

/// Update every door in one scope
pub fn update_all_doors(doc: &mut Document, options: &DoorNumberOptions) -> CommandOutcome<usize> {
    let ids: Vec<ElementId> = doc.doors().iter().map(|d| d.id).collect();
    run_batch(doc, "Update doors", &ids, options)
}

/// Update the doors among `selection` in one scope. Cancelled when the
/// selection is empty or holds no doors.
pub fn update_selected_doors(
    doc: &mut Document,
    selection: &[ElementId],
    options: &DoorNumberOptions,
) -> CommandOutcome<usize> {
    if selection.is_empty() {
        return CommandOutcome::Cancelled("no selection: select one or more doors".to_string());
    }
    let ids: Vec<ElementId> = selection
        .iter()
        .copied()
        .filter(|id| doc.door(*id).is_some())
        .collect();
    if ids.is_empty() {
        return CommandOutcome::Cancelled("no doors: the selection contains no doors".to_string());
    }
    run_batch(doc, "Update selected doors", &ids, options)
}

fn run_batch(doc: &mut Document, name: &str, ids: &[ElementId], options: &DoorNumberOptions) -> CommandOutcome<usize> {
    let mut scope = MutationScope::open(doc, name);
    for id in ids {
        if let Err(err) = update_door(&mut scope, *id, options) {
            error!(door = %id, error = %err, "Door update failed; rolled back");
            scope.rollback();
            return CommandOutcome::Failed(err.to_string());
        }
    }
    let changes = scope.commit();
    info!(scope = name, doors = ids.len(), changes = changes.len(), "Doors updated");
    CommandOutcome::Succeeded(ids.len())
}

// ============================================================================
// 4. Preview
// ============================================================================

/// Number the first door would receive with `options`; `None` without doors
pub fn preview_door_number(doc: &Document, options: &DoorNumberOptions) -> Option<String> {
    let door = doc.doors().first()?;
    Some(DoorContext::gather(doc, door, options).door_number(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use headroom_model::{Attribute, AttributeSchema, Category, Level, Space, StorageKind, Wall};

    fn room(id: u64, name: &str, number: &str) -> Space {
        let mut space = Space::new(ElementId(id), name, ElementId(1));
        space.number = number.to_string();
        space
    }

    /// Two rooms, a wall, two doors; door attributes provisioned
    fn model() -> Document {
        let mut doc = Document::new("Doors");
        doc.insert_level(Level { id: ElementId(1), name: "EG".into(), elevation: 0.0 }).unwrap();
        doc.insert_space(room(10, "Flur", "0.01")).unwrap();
        doc.insert_space(room(11, "Büro", "0.02")).unwrap();
        doc.insert_wall(Wall::new(ElementId(30), "IW", "Kalksandstein")).unwrap();

        let mut d1 = Door::new(ElementId(40), "T1");
        d1.from_room = Some(ElementId(10));
        d1.to_room = Some(ElementId(11));
        d1.host_wall = Some(ElementId(30));
        d1.attributes.insert("TürIndex", Attribute::with_value("a"));
        doc.insert_door(d1).unwrap();
        doc.insert_door(Door::new(ElementId(41), "T2")).unwrap();

        let schema = AttributeSchema::builtin();
        let mut scope = MutationScope::open(&mut doc, "Provision doors");
        headroom_model::ensure_schema(&mut scope, &schema, Category::Door).unwrap();
        scope.commit();
        doc
    }

    fn text<'d>(doc: &'d Document, door: u64, name: &str) -> Option<&'d str> {
        doc.door(ElementId(door)).unwrap().attributes.text(name)
    }

    #[test]
    fn test_update_all_doors() {
        let mut doc = model();
        let outcome = update_all_doors(&mut doc, &DoorNumberOptions::default());
        assert_eq!(outcome, CommandOutcome::Succeeded(2));

        assert_eq!(text(&doc, 40, FROM_ROOM_NAME), Some("Flur"));
        assert_eq!(text(&doc, 40, FROM_ROOM_NUMBER), Some("0.01"));
        assert_eq!(text(&doc, 40, TO_ROOM_NAME), Some("Büro"));
        assert_eq!(text(&doc, 40, TO_ROOM_NUMBER), Some("0.02"));
        assert_eq!(text(&doc, 40, WALL_MATERIAL), Some("Kalksandstein"));
        assert_eq!(text(&doc, 40, "KAI_TUE_Nummer"), Some("0.02"));

        assert_eq!(text(&doc, 41, TO_ROOM_NAME), Some(""));
        assert_eq!(text(&doc, 41, "KAI_TUE_Nummer"), Some(""));
    }

    #[test]
    fn test_extra_attribute_and_separator() {
        let mut doc = model();
        let options = DoorNumberOptions {
            extra_attribute: "TürIndex".into(),
            separator: ".".into(),
            ..Default::default()
        };
        update_all_doors(&mut doc, &options);
        assert_eq!(text(&doc, 40, "KAI_TUE_Nummer"), Some("0.02.a"));
        assert_eq!(preview_door_number(&doc, &options).as_deref(), Some("0.02.a"));
    }

    #[test]
    fn test_custom_number_attribute_and_read_only() {
        let mut doc = model();
        let mut locked = Door::new(ElementId(42), "T3");
        locked.to_room = Some(ElementId(10));
        locked.host_wall = Some(ElementId(30));
        locked
            .attributes
            .insert(WALL_MATERIAL, Attribute::with_value("Holz").read_only());
        doc.insert_door(locked).unwrap();
        {
            let mut scope = MutationScope::open(&mut doc, "setup");
            scope.bind_attribute("Mark", StorageKind::Text, Category::Door).unwrap();
            scope.commit();
        }
        let options = DoorNumberOptions {
            number_attribute: "Mark".into(),
            ..Default::default()
        };
        update_all_doors(&mut doc, &options);
        assert_eq!(text(&doc, 40, "Mark"), Some("0.02"));
        assert_eq!(text(&doc, 40, "KAI_TUE_Nummer"), None);

        assert_eq!(text(&doc, 42, WALL_MATERIAL), Some("Holz"));
        assert_eq!(text(&doc, 42, TO_ROOM_NAME), Some("Flur"));
        assert_eq!(text(&doc, 42, "Mark"), Some("0.01"));
    }

    #[test]
    fn test_missing_attributes_are_skipped() {
        let mut doc = Document::new("Bare");
        doc.insert_door(Door::new(ElementId(1), "T")).unwrap();
        assert_eq!(
            update_all_doors(&mut doc, &DoorNumberOptions::default()),
            CommandOutcome::Succeeded(1)
        );
        assert!(doc.door(ElementId(1)).unwrap().attributes.is_empty());
    }

    #[test]
    fn test_selected_doors() {
        let mut doc = model();
        let options = DoorNumberOptions::default();
        assert!(matches!(
            update_selected_doors(&mut doc, &[], &options),
            CommandOutcome::Cancelled(m) if m.starts_with("no selection")
        ));
        assert!(matches!(
            update_selected_doors(&mut doc, &[ElementId(10), ElementId(30)], &options),
            CommandOutcome::Cancelled(m) if m.starts_with("no doors")
        ));
        assert_eq!(
            update_selected_doors(&mut doc, &[ElementId(10), ElementId(40)], &options),
            CommandOutcome::Succeeded(1)
        );
        assert_eq!(text(&doc, 40, TO_ROOM_NAME), Some("Büro"));
        assert_eq!(text(&doc, 41, TO_ROOM_NAME), None);
    }

    #[test]
    fn test_preview_without_doors() {
        let doc = Document::new("Empty");
        assert!(preview_door_number(&doc, &DoorNumberOptions::default()).is_none());
    }
}
