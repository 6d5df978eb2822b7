//! Error types for door propagation
//!
//! ## Table of Contents
//! 1. PropagationError - Main error enum
//! 2. Result alias

use std::path::PathBuf;

use headroom_model::ModelError;
use thiserror::Error;

/// Errors raised by door propagation and the updater bus
#[derive(Error, Debug)]
pub enum PropagationError {
    /// No per-user config directory on this platform
    #[error("Could not determine the user config directory")]
    NoConfigDir,

    /// Options file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Options file could not be parsed
    #[error("Options parse error: {0}")]
    OptionsParse(#[from] toml::de::Error),

    /// Options could not be serialized
    #[error("Options serialization error: {0}")]
    OptionsWrite(#[from] toml::ser::Error),

    /// Change set could not be parsed
    #[error("Change set error: {0}")]
    ChangeSet(#[from] serde_json::Error),

    /// An updater with this id is already registered
    #[error("Updater already registered: {0}")]
    AlreadyRegistered(String),

    /// Underlying model edit failed
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl PropagationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PropagationError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for propagation operations
pub type Result<T> = std::result::Result<T, PropagationError>;
