//! # Document
//!
//! The in-memory building model. Holds levels, spaces, surfaces, doors,
//! walls and views, the project unit settings, and the attribute bindings
//! created by schema provisioning.
//!
//! Construction (`insert_*`) is for building or loading a model. Edits to an
//! existing model go through `MutationScope`.
//!
//! ## Table of Contents
//! 1. AttributeBinding
//! 2. Document — construction
//! 3. Document — lookups
//! 4. Document — envelope resolution
//! 5. Document — file I/O and validation

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::attribute::{Attribute, AttributeSet, StorageKind};
use crate::element::{Category, Door, ElementId, Level, Space, Surface, Wall};
use crate::error::{ModelError, Result};
use crate::geometry::BoundingEnvelope;
use crate::units::ProjectUnits;
use crate::view::View;

// ============================================================================
// 1. AttributeBinding
// ============================================================================

/// An attribute definition bound to one or more categories. Every element of
/// a bound category carries the attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeBinding {
    pub name: String,
    pub kind: StorageKind,
    pub categories: BTreeSet<Category>,
}

// ============================================================================
// 2. Document — construction
// ============================================================================

/// Building model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub(crate) units: ProjectUnits,
    #[serde(default)]
    pub(crate) levels: Vec<Level>,
    #[serde(default)]
    pub(crate) spaces: Vec<Space>,
    #[serde(default)]
    pub(crate) surfaces: Vec<Surface>,
    #[serde(default)]
    pub(crate) doors: Vec<Door>,
    #[serde(default)]
    pub(crate) walls: Vec<Wall>,
    #[serde(default)]
    pub(crate) views: Vec<View>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) active_view: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) bindings: Vec<AttributeBinding>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_units(mut self, units: ProjectUnits) -> Self {
        self.units = units;
        self
    }

    pub fn insert_level(&mut self, level: Level) -> Result<()> {
        self.ensure_free(level.id)?;
        self.levels.push(level);
        Ok(())
    }

    /// Insert a space. Its reference level must already exist.
    pub fn insert_space(&mut self, mut space: Space) -> Result<()> {
        self.ensure_free(space.id)?;
        if self.level(space.level).is_none() {
            return Err(ModelError::ElementNotFound(space.level));
        }
        self.apply_bindings(Category::Room, &mut space.attributes);
        self.spaces.push(space);
        Ok(())
    }

    pub fn insert_surface(&mut self, mut surface: Surface) -> Result<()> {
        self.ensure_free(surface.id)?;
        self.apply_bindings(surface.category, &mut surface.attributes);
        self.surfaces.push(surface);
        Ok(())
    }

    pub fn insert_door(&mut self, mut door: Door) -> Result<()> {
        self.ensure_free(door.id)?;
        self.apply_bindings(Category::Door, &mut door.attributes);
        self.doors.push(door);
        Ok(())
    }

    pub fn insert_wall(&mut self, mut wall: Wall) -> Result<()> {
        self.ensure_free(wall.id)?;
        self.apply_bindings(Category::Wall, &mut wall.attributes);
        self.walls.push(wall);
        Ok(())
    }

    pub fn insert_view(&mut self, view: View) -> Result<()> {
        self.ensure_free(view.id)?;
        self.views.push(view);
        Ok(())
    }

    /// Make `id` the active view (or clear it)
    pub fn set_active_view(&mut self, id: Option<ElementId>) -> Result<()> {
        if let Some(id) = id {
            if self.view(id).is_none() {
                return Err(ModelError::ElementNotFound(id));
            }
        }
        self.active_view = id;
        Ok(())
    }

    fn ensure_free(&self, id: ElementId) -> Result<()> {
        if self.contains(id) {
            Err(ModelError::DuplicateElement(id))
        } else {
            Ok(())
        }
    }

    /// Add empty slots for every binding on `category` the set lacks
    pub(crate) fn apply_bindings(&self, category: Category, attributes: &mut AttributeSet) {
        for binding in self.bindings.iter().filter(|b| b.categories.contains(&category)) {
            if !attributes.contains(&binding.name) {
                attributes.insert(binding.name.clone(), Attribute::empty(binding.kind));
            }
        }
    }

    // ========================================================================
    // 3. Document — lookups
    // ========================================================================

    pub fn units(&self) -> &ProjectUnits {
        &self.units
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn surfaces_of(&self, category: Category) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter().filter(move |s| s.category == category)
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn bindings(&self) -> &[AttributeBinding] {
        &self.bindings
    }

    pub fn level(&self, id: ElementId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn space(&self, id: ElementId) -> Option<&Space> {
        self.spaces.iter().find(|s| s.id == id)
    }

    pub fn surface(&self, id: ElementId) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.id == id)
    }

    pub fn door(&self, id: ElementId) -> Option<&Door> {
        self.doors.iter().find(|d| d.id == id)
    }

    pub fn wall(&self, id: ElementId) -> Option<&Wall> {
        self.walls.iter().find(|w| w.id == id)
    }

    pub fn view(&self, id: ElementId) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }

    /// The active view, whatever its kind
    pub fn active_view(&self) -> Option<&View> {
        self.active_view.and_then(|id| self.view(id))
    }

    /// The active view if it is a 3D view
    pub fn active_view_3d(&self) -> Option<&View> {
        self.active_view().filter(|v| v.is_three_d())
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.category_of(id).is_some() || self.view(id).is_some()
    }

    /// Category of a model element (views have none)
    pub fn category_of(&self, id: ElementId) -> Option<Category> {
        if self.level(id).is_some() {
            Some(Category::Level)
        } else if self.space(id).is_some() {
            Some(Category::Room)
        } else if let Some(s) = self.surface(id) {
            Some(s.category)
        } else if self.door(id).is_some() {
            Some(Category::Door)
        } else if self.wall(id).is_some() {
            Some(Category::Wall)
        } else {
            None
        }
    }

    /// Ids of every element in `category`, in insertion order
    pub fn elements_of(&self, category: Category) -> Vec<ElementId> {
        match category {
            Category::Level => self.levels.iter().map(|l| l.id).collect(),
            Category::Room => self.spaces.iter().map(|s| s.id).collect(),
            Category::Door => self.doors.iter().map(|d| d.id).collect(),
            Category::Wall => self.walls.iter().map(|w| w.id).collect(),
            other => self.surfaces_of(other).map(|s| s.id).collect(),
        }
    }

    pub fn attributes(&self, id: ElementId) -> Option<&AttributeSet> {
        if let Some(s) = self.space(id) {
            Some(&s.attributes)
        } else if let Some(s) = self.surface(id) {
            Some(&s.attributes)
        } else if let Some(d) = self.door(id) {
            Some(&d.attributes)
        } else {
            self.wall(id).map(|w| &w.attributes)
        }
    }

    pub(crate) fn attributes_mut(&mut self, id: ElementId) -> Option<&mut AttributeSet> {
        if let Some(s) = self.spaces.iter_mut().find(|s| s.id == id) {
            return Some(&mut s.attributes);
        }
        if let Some(s) = self.surfaces.iter_mut().find(|s| s.id == id) {
            return Some(&mut s.attributes);
        }
        if let Some(d) = self.doors.iter_mut().find(|d| d.id == id) {
            return Some(&mut d.attributes);
        }
        self.walls.iter_mut().find(|w| w.id == id).map(|w| &mut w.attributes)
    }

    pub(crate) fn door_mut(&mut self, id: ElementId) -> Option<&mut Door> {
        self.doors.iter_mut().find(|d| d.id == id)
    }

    pub(crate) fn wall_mut(&mut self, id: ElementId) -> Option<&mut Wall> {
        self.walls.iter_mut().find(|w| w.id == id)
    }

    // ========================================================================
    // 4. Document — envelope resolution
    // ========================================================================

    /// Bounding envelope of an element as seen in `view`. `None` when the
    /// element has no geometry, is hidden in the view, or lies outside the
    /// view's section box.
    pub fn bounding_envelope(&self, id: ElementId, view: &View) -> Option<BoundingEnvelope> {
        let geometric = if let Some(surface) = self.surface(id) {
            surface.envelope()
        } else if let Some(space) = self.space(id) {
            space.envelope
        } else {
            None
        }?;
        view.resolve(id, geometric)
    }

    // ========================================================================
    // 5. Document — file I/O and validation
    // ========================================================================

    /// Load a JSON model file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
        let doc = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            spaces = doc.spaces.len(),
            surfaces = doc.surfaces.len(),
            doors = doc.doors.len(),
            "Model loaded"
        );
        Ok(doc)
    }

    /// Save as JSON. Writes a sibling temp file first, then renames it over
    /// the target so a failed write never truncates the model.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_json_string()?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        std::fs::write(&tmp, content).map_err(|e| ModelError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| ModelError::io(path, e))?;
        debug!(path = %path.display(), "Model saved");
        Ok(())
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let doc: Document = serde_json::from_str(content)?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check id uniqueness, level references, active view and attribute
    /// value kinds
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let ids = self
            .levels
            .iter()
            .map(|l| l.id)
            .chain(self.spaces.iter().map(|s| s.id))
            .chain(self.surfaces.iter().map(|s| s.id))
            .chain(self.doors.iter().map(|d| d.id))
            .chain(self.walls.iter().map(|w| w.id))
            .chain(self.views.iter().map(|v| v.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(ModelError::DuplicateElement(id));
            }
        }

        for space in &self.spaces {
            if self.level(space.level).is_none() {
                return Err(ModelError::ElementNotFound(space.level));
            }
        }

        if let Some(id) = self.active_view {
            if self.view(id).is_none() {
                return Err(ModelError::ElementNotFound(id));
            }
        }

        let sets = self
            .spaces
            .iter()
            .map(|s| &s.attributes)
            .chain(self.surfaces.iter().map(|s| &s.attributes))
            .chain(self.doors.iter().map(|d| &d.attributes))
            .chain(self.walls.iter().map(|w| &w.attributes));
        for set in sets {
            for (name, attr) in set.iter() {
                if let Some(value) = &attr.value {
                    if value.kind() != attr.kind {
                        return Err(ModelError::KindMismatch {
                            name: name.clone(),
                            expected: attr.kind,
                            found: value.kind(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
