//! # Attributes
//!
//! Named, typed values attached to elements. Every write in Headroom goes
//! through `AttributeSet::write`, which looks the attribute up once and
//! reports a `Capability`: absent, blocked, or writable.
//!
//! ## Table of Contents
//! 1. StorageKind / AttributeValue
//! 2. Attribute
//! 3. Capability
//! 4. AttributeSet

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// 1. StorageKind / AttributeValue
// ============================================================================

/// How an attribute stores its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Number,
    Text,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Number => f.write_str("number"),
            StorageKind::Text => f.write_str("text"),
        }
    }
}

/// Attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn kind(&self) -> StorageKind {
        match self {
            AttributeValue::Number(_) => StorageKind::Number,
            AttributeValue::Text(_) => StorageKind::Text,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

// ============================================================================
// 2. Attribute
// ============================================================================

/// A single attribute slot on an element. `value` is `None` until first set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub kind: StorageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AttributeValue>,
    #[serde(default)]
    pub read_only: bool,
}

impl Attribute {
    /// Empty writable attribute of the given kind
    pub fn empty(kind: StorageKind) -> Self {
        Self {
            kind,
            value: None,
            read_only: false,
        }
    }

    /// Writable attribute holding `value`
    pub fn with_value(value: impl Into<AttributeValue>) -> Self {
        let value = value.into();
        Self {
            kind: value.kind(),
            value: Some(value),
            read_only: false,
        }
    }

    /// Mark read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn as_number(&self) -> Option<f64> {
        match &self.value {
            Some(AttributeValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            Some(AttributeValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// 3. Capability
// ============================================================================

/// Why a present attribute cannot take a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Stored kind differs from the value being written
    WrongKind(StorageKind),
    ReadOnly,
}

/// Result of looking up an attribute for writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// No attribute with that name on the element
    Absent,
    /// Present but not writable with this kind
    Blocked(BlockReason),
    /// Present, matching kind, not read-only
    Writable,
}

impl Capability {
    pub fn is_writable(&self) -> bool {
        matches!(self, Capability::Writable)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Absent => f.write_str("absent"),
            Capability::Blocked(BlockReason::ReadOnly) => f.write_str("read-only"),
            Capability::Blocked(BlockReason::WrongKind(k)) => write!(f, "stores {}", k),
            Capability::Writable => f.write_str("writable"),
        }
    }
}

// ============================================================================
// 4. AttributeSet
// ============================================================================

/// Attributes of one element, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    values: BTreeMap<String, Attribute>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Insert or replace an attribute slot
    pub fn insert(&mut self, name: impl Into<String>, attribute: Attribute) {
        self.values.insert(name.into(), attribute);
    }

    /// Builder form of `insert`
    pub fn with(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.insert(name, attribute);
        self
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Attribute::as_number)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Attribute::as_text)
    }

    /// Tri-state lookup: can `name` take a value of `kind`?
    pub fn capability(&self, name: &str, kind: StorageKind) -> Capability {
        match self.values.get(name) {
            None => Capability::Absent,
            Some(attr) if attr.kind != kind => Capability::Blocked(BlockReason::WrongKind(attr.kind)),
            Some(attr) if attr.read_only => Capability::Blocked(BlockReason::ReadOnly),
            Some(_) => Capability::Writable,
        }
    }

    /// Write `value` when the attribute is writable. Returns the capability
    /// that was observed and whether the stored value changed.
    pub fn write(&mut self, name: &str, value: AttributeValue) -> (Capability, bool) {
        let capability = self.capability(name, value.kind());
        if !capability.is_writable() {
            return (capability, false);
        }
        let changed = match self.values.get_mut(name) {
            Some(attr) if attr.value.as_ref() != Some(&value) => {
                attr.value = Some(value);
                true
            }
            _ => false,
        };
        (capability, changed)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Attribute)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
