//! # Attribute Schema
//!
//! Named attribute definitions, grouped the way a shared definition file
//! groups them, and provisioning of those definitions onto a category.
//!
//! Schema files are TOML:
//!
//! ```toml
//! [[group]]
//! name = "Doors"
//!
//! [[group.definition]]
//! name = "InRaum_Name"
//! kind = "text"
//! ```
//!
//! ## Table of Contents
//! 1. AttributeDefinition / AttributeSchema
//! 2. Built-in schema and required attribute sets
//! 3. Provisioning

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::attribute::StorageKind;
use crate::element::Category;
use crate::error::{ModelError, Result};
use crate::scope::MutationScope;

// ============================================================================
// 1. AttributeDefinition / AttributeSchema
// ============================================================================

/// One attribute definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub kind: StorageKind,
}

/// Named group of definitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaGroup {
    pub name: String,
    #[serde(default, rename = "definition")]
    pub definitions: Vec<AttributeDefinition>,
}

/// A set of definition groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    #[serde(default, rename = "group")]
    pub groups: Vec<SchemaGroup>,
}

impl AttributeSchema {
    /// Load a TOML schema file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
        let schema = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), groups = schema.groups.len(), "Schema loaded");
        Ok(schema)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// First definition named `name`, searching every group
    pub fn find(&self, name: &str) -> Option<&AttributeDefinition> {
        self.groups
            .iter()
            .flat_map(|g| g.definitions.iter())
            .find(|d| d.name == name)
    }

    // ========================================================================
    // 2. Built-in schema and required attribute sets
    // ========================================================================

    /// Definitions for every attribute Headroom writes
    pub fn builtin() -> Self {
        fn group(name: &str, defs: &[(&str, StorageKind)]) -> SchemaGroup {
            SchemaGroup {
                name: name.to_string(),
                definitions: defs
                    .iter()
                    .map(|(n, k)| AttributeDefinition {
                        name: n.to_string(),
                        kind: *k,
                    })
                    .collect(),
            }
        }

        Self {
            groups: vec![
                group(
                    "Geometry",
                    &[
                        ("KAI_GEO_Lichte_Höhe", StorageKind::Number),
                        ("KAI_GEO_Höhe_FBOK", StorageKind::Text),
                        ("KAI_GEO_Höhe_UK_Decke", StorageKind::Text),
                    ],
                ),
                group(
                    "Doors",
                    &[
                        ("InRaum_Name", StorageKind::Text),
                        ("InRaum_Nummer", StorageKind::Text),
                        ("AusRaum_Name", StorageKind::Text),
                        ("AusRaum_Nummer", StorageKind::Text),
                        ("KAI_TUE_Nummer", StorageKind::Text),
                        ("KAI_TUE_Wandmaterial", StorageKind::Text),
                    ],
                ),
            ],
        }
    }
}

/// Attributes the clearance run writes on rooms
pub const ROOM_ATTRIBUTES: &[&str] = &["KAI_GEO_Lichte_Höhe", "KAI_GEO_Höhe_FBOK", "KAI_GEO_Höhe_UK_Decke"];

/// Attributes door propagation writes
pub const DOOR_ATTRIBUTES: &[&str] = &[
    "InRaum_Name",
    "InRaum_Nummer",
    "AusRaum_Name",
    "AusRaum_Nummer",
    "KAI_TUE_Nummer",
    "KAI_TUE_Wandmaterial",
];

/// Attribute names provisioned for `category`; empty for categories
/// nothing writes to
pub fn required_attributes(category: Category) -> &'static [&'static str] {
    match category {
        Category::Room => ROOM_ATTRIBUTES,
        Category::Door => DOOR_ATTRIBUTES,
        _ => &[],
    }
}

// ============================================================================
// 3. Provisioning
// ============================================================================

/// Outcome of provisioning a category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub category: Option<Category>,
    /// Newly bound attribute names
    pub added: Vec<String>,
    /// Names that were already bound
    pub already_present: Vec<String>,
    /// Names the schema has no definition for
    pub missing_definitions: Vec<String>,
}

impl ProvisionReport {
    /// User-facing summary
    pub fn message(&self) -> String {
        let category = self.category.map(|c| c.as_str()).unwrap_or("element");
        let mut out = if self.added.is_empty() {
            format!("All required {} attributes are already present.", category)
        } else {
            let mut s = format!("Added {} attribute(s):", category);
            for name in &self.added {
                s.push_str("\n  • ");
                s.push_str(name);
            }
            s
        };
        if !self.missing_definitions.is_empty() {
            out.push_str("\nNo definition found for: ");
            out.push_str(&self.missing_definitions.join(", "));
        }
        out
    }
}

/// Bind every name in `names` to `category`, taking the storage kind from
/// `schema`. Names without a definition are skipped and reported.
pub fn ensure_attributes(
    scope: &mut MutationScope<'_>,
    schema: &AttributeSchema,
    category: Category,
    names: &[&str],
) -> Result<ProvisionReport> {
    let mut report = ProvisionReport {
        category: Some(category),
        ..Default::default()
    };

    for name in names {
        let Some(definition) = schema.find(name) else {
            debug!(attribute = name, "No schema definition; skipped");
            report.missing_definitions.push(name.to_string());
            continue;
        };
        if scope.bind_attribute(&definition.name, definition.kind, category)? {
            report.added.push(definition.name.clone());
        } else {
            report.already_present.push(definition.name.clone());
        }
    }

    info!(
        category = %category,
        added = report.added.len(),
        present = report.already_present.len(),
        missing = report.missing_definitions.len(),
        "Attribute schema provisioned"
    );
    Ok(report)
}

/// Provision the attributes Headroom needs on `category`
pub fn ensure_schema(
    scope: &mut MutationScope<'_>,
    schema: &AttributeSchema,
    category: Category,
) -> Result<ProvisionReport> {
    ensure_attributes(scope, schema, category, required_attributes(category))
}
