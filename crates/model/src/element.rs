//! # Elements
//!
//! The element kinds a building model holds. Every element carries an
//! `ElementId` unique across the document and an `AttributeSet`.
//!
//! ## Table of Contents
//! 1. ElementId / Category
//! 2. Level
//! 3. Space
//! 4. Surface
//! 5. Door / Wall

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::attribute::AttributeSet;
use crate::geometry::BoundingEnvelope;

// ============================================================================
// 1. ElementId / Category
// ============================================================================

/// Document-wide element identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl std::str::FromStr for ElementId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(ElementId)
    }
}

/// Element category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Level,
    Room,
    Ceiling,
    Floor,
    Roof,
    Door,
    Wall,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Level => "level",
            Category::Room => "room",
            Category::Ceiling => "ceiling",
            Category::Floor => "floor",
            Category::Roof => "roof",
            Category::Door => "door",
            Category::Wall => "wall",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "level" | "levels" => Ok(Category::Level),
            "room" | "rooms" | "space" | "spaces" => Ok(Category::Room),
            "ceiling" | "ceilings" => Ok(Category::Ceiling),
            "floor" | "floors" => Ok(Category::Floor),
            "roof" | "roofs" => Ok(Category::Roof),
            "door" | "doors" => Ok(Category::Door),
            "wall" | "walls" => Ok(Category::Wall),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

// ============================================================================
// 2. Level
// ============================================================================

/// Named horizontal datum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: ElementId,
    pub name: String,
    /// Elevation in internal units
    pub elevation: f64,
}

// ============================================================================
// 3. Space
// ============================================================================

/// An enclosed space (room). Heights are in internal units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub id: ElementId,
    pub name: String,
    #[serde(default)]
    pub number: String,
    /// Level the space sits on
    pub level: ElementId,
    /// Offset of the space's floor above its level; absent means 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_offset: Option<f64>,
    /// Explicit upper limit level, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_level: Option<ElementId>,
    /// Offset above `upper_level`; absent means 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_offset: Option<f64>,
    /// Height above the level used when there is no upper limit level
    #[serde(default)]
    pub unbounded_height: f64,
    /// Placement point; spaces without one cannot be probed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<DVec3>,
    /// Extent of the space volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<BoundingEnvelope>,
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl Space {
    /// Minimal space on `level` with a placement point and unbounded height
    pub fn new(id: ElementId, name: impl Into<String>, level: ElementId) -> Self {
        Self {
            id,
            name: name.into(),
            number: String::new(),
            level,
            lower_offset: None,
            upper_level: None,
            upper_offset: None,
            unbounded_height: 0.0,
            location: None,
            envelope: None,
            attributes: AttributeSet::new(),
        }
    }

    /// Location if every coordinate is finite
    pub fn reference_point(&self) -> Option<DVec3> {
        self.location.filter(|p| p.is_finite())
    }
}

// ============================================================================
// 4. Surface
// ============================================================================

/// Horizontal slab-like element (ceiling, floor, roof): a planar footprint
/// extruded between `bottom` and `top`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    pub category: Category,
    /// Footprint polygon in plan
    pub footprint: Vec<DVec2>,
    /// Underside elevation
    pub bottom: f64,
    /// Top elevation
    pub top: f64,
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl Surface {
    pub fn new(id: ElementId, category: Category, footprint: Vec<DVec2>, bottom: f64, top: f64) -> Self {
        Self {
            id,
            name: String::new(),
            category,
            footprint,
            bottom,
            top,
            attributes: AttributeSet::new(),
        }
    }

    /// Geometric envelope; `None` when the footprint is degenerate
    pub fn envelope(&self) -> Option<BoundingEnvelope> {
        if self.footprint.len() < 3 {
            return None;
        }
        BoundingEnvelope::from_footprint(&self.footprint, self.bottom, self.top)
    }
}

// ============================================================================
// 5. Door / Wall
// ============================================================================

/// Door hosted in a wall, connecting two rooms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<ElementId>,
    /// Room on the swing-from side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_room: Option<ElementId>,
    /// Room on the swing-to side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_room: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_wall: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<DVec3>,
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl Door {
    pub fn new(id: ElementId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            level: None,
            from_room: None,
            to_room: None,
            host_wall: None,
            location: None,
            attributes: AttributeSet::new(),
        }
    }
}

/// Wall with a material description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl Wall {
    pub fn new(id: ElementId, name: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            material: material.into(),
            attributes: AttributeSet::new(),
        }
    }
}
