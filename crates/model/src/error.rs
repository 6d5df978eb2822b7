//! Error types for the building model
//!
//! ## Table of Contents
//! 1. ModelError - Main error enum
//! 2. Result alias

use std::path::PathBuf;

use thiserror::Error;

use crate::attribute::StorageKind;
use crate::element::ElementId;

/// Errors raised while loading, saving or mutating a building model
#[derive(Error, Debug)]
pub enum ModelError {
    /// File I/O error, with the path that failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON model file could not be parsed or written
    #[error("Model serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML schema file could not be parsed
    #[error("Schema parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No element with this id exists in the document
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// An element with this id already exists
    #[error("Duplicate element id: {0}")]
    DuplicateElement(ElementId),

    /// Attribute value does not match the attribute's storage kind
    #[error("Attribute '{name}' stores {expected}, got {found}")]
    KindMismatch {
        name: String,
        expected: StorageKind,
        found: StorageKind,
    },
}

impl ModelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModelError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
