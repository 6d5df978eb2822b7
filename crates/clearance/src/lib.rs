//! # Headroom Clearance
//!
//! Computes the vertical clearance of every enclosed space: a ray is cast
//! upward from the space's floor elevation against ceiling surfaces, the
//! nearest underside (or the nominal upper bound when nothing is hit)
//! gives the clearance, and the result is written back with two formatted
//! elevation texts. The whole run is one mutation scope.
//!
//! Per space:
//! `enumerate` → `elevation` → `probe` → `calculator` → `writer`,
//! with `anomaly` collecting skipped and flagged spaces on the side.
//!
//! ## Table of Contents
//! 1. Module declarations
//! 2. Re-exports

pub mod anomaly;
pub mod calculator;
pub mod command;
pub mod config;
pub mod elevation;
pub mod enumerate;
pub mod error;
pub mod probe;
pub mod writer;

pub use anomaly::{Anomaly, AnomalyCollector, AnomalyReason};
pub use calculator::{calculate, Branch, Clearance};
pub use command::{run, run_clearance, run_with_query, ClearanceReport, RunMode, SCOPE_NAME};
pub use config::{AttributeNames, ClearanceConfig};
pub use elevation::{base_elevation, max_search_distance, upper_bound, UpperBound, UpperSource};
pub use enumerate::{enumerate_spaces, Candidate};
pub use error::{ClearanceError, Result};
pub use probe::SurfaceQuery;
pub use writer::AttributeWriter;
