//! # Headroom Propagation
//!
//! Door attribute propagation: adjoining-room names and numbers, host wall
//! material and composed door numbers are copied onto doors, either by
//! batch command or reactively through the updater bus when doors and
//! walls change.
//!
//! ## Modules
//! - `options`: door number options and their per-user store
//! - `number`: door number composition
//! - `door`: single-door update, batch commands, preview
//! - `bus`: updater trait, triggers, context flag, registry and dispatch
//! - `updater`: the door updater
//! - `changes`: JSON change sets applied with updater dispatch
//!
//! ## Table of Contents
//! 1. Module declarations
//! 2. Re-exports

pub mod bus;
pub mod changes;
pub mod door;
pub mod error;
pub mod number;
pub mod options;
pub mod updater;

pub use bus::{ChangePriority, Trigger, Updater, UpdaterContext, UpdaterId, UpdaterRegistry};
pub use changes::{apply_changes, ApplyReport, ChangeSet, Edit};
pub use door::{preview_door_number, update_all_doors, update_door, update_selected_doors, DoorContext};
pub use error::{PropagationError, Result};
pub use number::compose_door_number;
pub use options::{DoorNumberOptions, OptionsStore};
pub use updater::{sync_door_updater, DoorUpdater, DOOR_UPDATER_ID};
