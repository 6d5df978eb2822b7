//! # Mutation Scope
//!
//! An all-or-nothing batch of edits to a `Document`. Opening a scope
//! snapshots the document; `commit` keeps the edits, `rollback` (or dropping
//! the scope uncommitted) restores the snapshot.
//!
//! The scope borrows the document mutably for its whole life, so no other
//! writer can interleave with a batch.
//!
//! Every edit that changes the model records a `ChangeEvent`. Pending events
//! can be drained for dispatch to updaters; the full journal is returned by
//! `commit`.
//!
//! ## Table of Contents
//! 1. ChangeEvent / ChangeKind
//! 2. MutationScope — lifecycle
//! 3. MutationScope — attribute edits
//! 4. MutationScope — element edits

use glam::DVec3;
use tracing::{debug, info};

use crate::attribute::{Attribute, AttributeValue, Capability, StorageKind};
use crate::document::{AttributeBinding, Document};
use crate::element::{Category, Door, ElementId};
use crate::error::{ModelError, Result};

// ============================================================================
// 1. ChangeEvent / ChangeKind
// ============================================================================

/// Kind of change recorded for an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
}

/// One recorded change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub element: ElementId,
    pub category: Category,
    pub kind: ChangeKind,
}

// ============================================================================
// 2. MutationScope — lifecycle
// ============================================================================

/// Atomic edit batch over a document
pub struct MutationScope<'d> {
    doc: &'d mut Document,
    name: String,
    snapshot: Option<Document>,
    pending: Vec<ChangeEvent>,
    journal: Vec<ChangeEvent>,
}

impl<'d> MutationScope<'d> {
    /// Open a scope named `name` over `doc`
    pub fn open(doc: &'d mut Document, name: impl Into<String>) -> Self {
        let name = name.into();
        debug!(scope = %name, "Mutation scope opened");
        let snapshot = Some(doc.clone());
        Self {
            doc,
            name,
            snapshot,
            pending: Vec::new(),
            journal: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read access to the document as edited so far
    pub fn document(&self) -> &Document {
        &*self.doc
    }

    /// Events recorded since the last `take_pending`
    pub fn pending(&self) -> &[ChangeEvent] {
        &self.pending
    }

    /// Drain pending events (the journal keeps them)
    pub fn take_pending(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Keep every edit. Returns the full change journal.
    pub fn commit(mut self) -> Vec<ChangeEvent> {
        self.snapshot = None;
        info!(scope = %self.name, changes = self.journal.len(), "Mutation scope committed");
        std::mem::take(&mut self.journal)
    }

    /// Discard every edit
    pub fn rollback(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.doc = snapshot;
            info!(scope = %self.name, discarded = self.journal.len(), "Mutation scope rolled back");
        }
    }

    fn record(&mut self, element: ElementId, category: Category, kind: ChangeKind) {
        let event = ChangeEvent { element, category, kind };
        self.pending.push(event);
        self.journal.push(event);
    }

    fn category(&self, id: ElementId) -> Result<Category> {
        self.doc.category_of(id).ok_or(ModelError::ElementNotFound(id))
    }

    // ========================================================================
    // 3. MutationScope — attribute edits
    // ========================================================================

    /// Write an attribute through the tri-state capability. Missing,
    /// mismatched or read-only attributes are left alone; the observed
    /// capability is returned so the caller can decide how loudly to skip.
    pub fn set_attribute(
        &mut self,
        id: ElementId,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<Capability> {
        let category = self.category(id)?;
        let attributes = self
            .doc
            .attributes_mut(id)
            .ok_or(ModelError::ElementNotFound(id))?;
        let (capability, changed) = attributes.write(name, value.into());
        if changed {
            self.record(id, category, ChangeKind::Modified);
        }
        Ok(capability)
    }

    /// Reset a text attribute to the empty string
    pub fn clear_text(&mut self, id: ElementId, name: &str) -> Result<Capability> {
        self.set_attribute(id, name, AttributeValue::Text(String::new()))
    }

    /// Tri-state lookup without writing
    pub fn capability(&self, id: ElementId, name: &str, kind: StorageKind) -> Result<Capability> {
        self.doc
            .attributes(id)
            .map(|a| a.capability(name, kind))
            .ok_or(ModelError::ElementNotFound(id))
    }

    /// Bind an attribute definition to `category`: record the binding and
    /// add an empty slot to every element of the category that lacks one.
    /// Returns `false` when the binding already existed.
    pub fn bind_attribute(&mut self, name: &str, kind: StorageKind, category: Category) -> Result<bool> {
        let position = self.doc.bindings.iter().position(|b| b.name == name);
        if let Some(i) = position {
            let binding = &mut self.doc.bindings[i];
            if binding.categories.contains(&category) {
                return Ok(false);
            }
            if binding.kind != kind {
                return Err(ModelError::KindMismatch {
                    name: name.to_string(),
                    expected: binding.kind,
                    found: kind,
                });
            }
            binding.categories.insert(category);
        } else {
            self.doc.bindings.push(AttributeBinding {
                name: name.to_string(),
                kind,
                categories: [category].into_iter().collect(),
            });
        }

        for id in self.doc.elements_of(category) {
            let Some(attributes) = self.doc.attributes_mut(id) else {
                continue;
            };
            if !attributes.contains(name) {
                attributes.insert(name, Attribute::empty(kind));
                self.record(id, category, ChangeKind::Modified);
            }
        }
        debug!(attribute = name, category = %category, "Attribute bound");
        Ok(true)
    }

    // ========================================================================
    // 4. MutationScope — element edits
    // ========================================================================

    /// Place a new door. Bound door attributes are added to it.
    pub fn add_door(&mut self, door: Door) -> Result<()> {
        let id = door.id;
        self.doc.insert_door(door)?;
        self.record(id, Category::Door, ChangeKind::Added);
        Ok(())
    }

    /// Re-link a door to the rooms on either side
    pub fn set_door_rooms(
        &mut self,
        id: ElementId,
        from_room: Option<ElementId>,
        to_room: Option<ElementId>,
    ) -> Result<()> {
        for room in from_room.iter().chain(to_room.iter()) {
            if self.doc.space(*room).is_none() {
                return Err(ModelError::ElementNotFound(*room));
            }
        }
        let door = self.doc.door_mut(id).ok_or(ModelError::ElementNotFound(id))?;
        door.from_room = from_room;
        door.to_room = to_room;
        self.record(id, Category::Door, ChangeKind::Modified);
        Ok(())
    }

    /// Move a door, optionally into another host wall
    pub fn move_door(&mut self, id: ElementId, location: DVec3, host_wall: Option<ElementId>) -> Result<()> {
        if let Some(wall) = host_wall {
            if self.doc.wall(wall).is_none() {
                return Err(ModelError::ElementNotFound(wall));
            }
        }
        let door = self.doc.door_mut(id).ok_or(ModelError::ElementNotFound(id))?;
        door.location = Some(location);
        if host_wall.is_some() {
            door.host_wall = host_wall;
        }
        self.record(id, Category::Door, ChangeKind::Modified);
        Ok(())
    }

    /// Change a wall's material description
    pub fn set_wall_material(&mut self, id: ElementId, material: impl Into<String>) -> Result<()> {
        let wall = self.doc.wall_mut(id).ok_or(ModelError::ElementNotFound(id))?;
        let material = material.into();
        if wall.material != material {
            wall.material = material;
            self.record(id, Category::Wall, ChangeKind::Modified);
        }
        Ok(())
    }
}

impl Drop for MutationScope<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}
