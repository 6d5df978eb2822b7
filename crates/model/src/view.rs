//! # Views
//!
//! A view is the scene context for envelope resolution and ray queries.
//! Only 3D views can host the clearance probe.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::geometry::BoundingEnvelope;

/// Kind of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    ThreeD,
    FloorPlan,
    Section,
}

/// A view of the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub id: ElementId,
    pub name: String,
    pub kind: ViewKind,
    /// Crop volume; elements outside it are not visible in the view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_box: Option<BoundingEnvelope>,
    /// Elements hidden in this view
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub hidden: BTreeSet<ElementId>,
}

impl View {
    /// Unrestricted 3D view
    pub fn three_d(id: ElementId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ViewKind::ThreeD,
            section_box: None,
            hidden: BTreeSet::new(),
        }
    }

    pub fn is_three_d(&self) -> bool {
        self.kind == ViewKind::ThreeD
    }

    pub fn is_hidden(&self, id: ElementId) -> bool {
        self.hidden.contains(&id)
    }

    /// Clip an element envelope to this view. `None` when the element is
    /// hidden or falls entirely outside the section box.
    pub fn resolve(&self, id: ElementId, envelope: BoundingEnvelope) -> Option<BoundingEnvelope> {
        if self.is_hidden(id) {
            return None;
        }
        match &self.section_box {
            Some(section) => envelope.intersection(section),
            None => Some(envelope),
        }
    }
}
