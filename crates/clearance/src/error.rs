//! Error types for the clearance engine
//!
//! ## Table of Contents
//! 1. ClearanceError - Main error enum
//! 2. Result alias

use std::path::PathBuf;

use headroom_model::ModelError;
use thiserror::Error;

/// Errors raised by the clearance engine
#[derive(Error, Debug)]
pub enum ClearanceError {
    /// No 3D view is active, so there is no scene to probe
    #[error("No active 3D view; open a 3D view to calculate clearance")]
    NoActive3dView,

    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Underlying model edit failed
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for clearance operations
pub type Result<T> = std::result::Result<T, ClearanceError>;
