//! # Headroom Model
//!
//! In-memory building model shared by every Headroom crate. A `Document` is
//! loaded from a JSON model file, read through typed element accessors, and
//! mutated only through a `MutationScope` that commits or rolls back as one
//! unit.
//!
//! ## Modules
//! - `error`: `ModelError` and the crate `Result` alias
//! - `units`: length units, conversions and display formatting
//! - `geometry`: bounding envelopes and footprint polygons
//! - `attribute`: typed attributes and the tri-state write capability
//! - `element`: levels, spaces, surfaces, doors, walls
//! - `view`: 3D views (scene contexts) with section boxes and hidden sets
//! - `document`: the document, element lookups, envelope resolution, file I/O
//! - `scope`: atomic mutation scopes and change events
//! - `index`: R-tree footprint index and the vertical probe
//! - `schema`: attribute definitions and category bindings
//! - `outcome`: succeeded / failed / cancelled command results
//!
//! ## Table of Contents
//! 1. Module declarations
//! 2. Re-exports

pub mod attribute;
pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod index;
pub mod outcome;
pub mod schema;
pub mod scope;
pub mod units;
pub mod view;

pub use attribute::{Attribute, AttributeSet, AttributeValue, BlockReason, Capability, StorageKind};
pub use document::{AttributeBinding, Document};
pub use element::{Category, Door, ElementId, Level, Space, Surface, Wall};
pub use error::{ModelError, Result};
pub use geometry::BoundingEnvelope;
pub use index::{Hit, SurfaceIndex};
pub use outcome::CommandOutcome;
pub use schema::{
    ensure_attributes, ensure_schema, required_attributes, AttributeDefinition, AttributeSchema, ProvisionReport,
    SchemaGroup,
};
pub use scope::{ChangeEvent, ChangeKind, MutationScope};
pub use units::{LengthUnit, ProjectUnits, UnitFormatter};
pub use view::{View, ViewKind};
