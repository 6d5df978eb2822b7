//! # Updater Bus
//!
//! Reactive updaters registered against (category, change kind) triggers.
//! After a batch of edits, the pending change events of a mutation scope
//! are dispatched to every matching updater, inside the same scope, so the
//! updaters' writes commit or roll back with the edits that caused them.
//!
//! Edits an updater makes while handling events are drained and not
//! dispatched again; a cascade is one level deep.
//!
//! Whether updaters run at all is an explicit `UpdaterContext` passed to
//! registration and dispatch.
//!
//! ## Table of Contents
//! 1. UpdaterId / ChangePriority / Trigger
//! 2. Updater trait
//! 3. UpdaterContext
//! 4. UpdaterRegistry

use headroom_model::{Category, ChangeEvent, ChangeKind, MutationScope};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{PropagationError, Result};

// ============================================================================
// 1. UpdaterId / ChangePriority / Trigger
// ============================================================================

/// Stable identity of an updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdaterId(pub Uuid);

impl std::fmt::Display for UpdaterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dispatch order; lower runs first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangePriority {
    FloorsRoofsStructuralWalls,
    DoorsOpeningsWindows,
    RoomsSpacesZones,
    Annotations,
}

/// Category and kind of change an updater listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trigger {
    pub category: Category,
    pub kind: ChangeKind,
}

impl Trigger {
    pub fn new(category: Category, kind: ChangeKind) -> Self {
        Self { category, kind }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        self.category == event.category && self.kind == event.kind
    }
}

// ============================================================================
// 2. Updater trait
// ============================================================================

/// A reaction to model changes
pub trait Updater {
    fn id(&self) -> UpdaterId;

    fn name(&self) -> &str;

    fn priority(&self) -> ChangePriority;

    /// Handle the events matching this updater's triggers. Writes go into
    /// `scope`.
    fn execute(&self, scope: &mut MutationScope<'_>, events: &[ChangeEvent]) -> Result<()>;
}

// ============================================================================
// 3. UpdaterContext
// ============================================================================

/// Whether automatic updates are on. Defaults to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdaterContext {
    enabled: bool,
}

impl Default for UpdaterContext {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl UpdaterContext {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the flag; returns the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        info!(enabled = self.enabled, "Automatic updates toggled");
        self.enabled
    }

    pub fn activate(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

// ============================================================================
// 4. UpdaterRegistry
// ============================================================================

struct Registration {
    updater: Box<dyn Updater>,
    triggers: Vec<Trigger>,
}

/// Registered updaters and their triggers
#[derive(Default)]
pub struct UpdaterRegistry {
    registrations: Vec<Registration>,
}

impl UpdaterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `updater` when `ctx` is enabled. Returns `false` (and
    /// registers nothing) while updates are off.
    pub fn register(&mut self, updater: Box<dyn Updater>, triggers: Vec<Trigger>, ctx: &UpdaterContext) -> Result<bool> {
        let id = updater.id();
        if self.is_registered(id) {
            return Err(PropagationError::AlreadyRegistered(id.to_string()));
        }
        if !ctx.is_enabled() {
            debug!(updater = updater.name(), "Updates disabled; not registered");
            return Ok(false);
        }
        info!(updater = updater.name(), id = %id, triggers = triggers.len(), "Updater registered");
        self.registrations.push(Registration { updater, triggers });
        self.registrations
            .sort_by_key(|r| r.updater.priority());
        Ok(true)
    }

    /// Remove an updater; returns whether it was registered
    pub fn unregister(&mut self, id: UpdaterId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.updater.id() != id);
        let removed = self.registrations.len() != before;
        if removed {
            info!(id = %id, "Updater unregistered");
        }
        removed
    }

    pub fn is_registered(&self, id: UpdaterId) -> bool {
        self.registrations.iter().any(|r| r.updater.id() == id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Hand `events` to every updater with a matching trigger, in priority
    /// order. Events the updaters produce are drained from the scope, not
    /// re-dispatched. Returns the number of updater invocations.
    pub fn dispatch(&self, scope: &mut MutationScope<'_>, events: &[ChangeEvent], ctx: &UpdaterContext) -> Result<usize> {
        if !ctx.is_enabled() || events.is_empty() {
            return Ok(0);
        }

        let mut invoked = 0;
        for registration in &self.registrations {
            let matching: Vec<ChangeEvent> = events
                .iter()
                .filter(|e| registration.triggers.iter().any(|t| t.matches(e)))
                .copied()
                .collect();
            if matching.is_empty() {
                continue;
            }
            debug!(updater = registration.updater.name(), events = matching.len(), "Dispatching");
            registration.updater.execute(scope, &matching)?;
            invoked += 1;
        }

        let cascaded = scope.take_pending();
        if !cascaded.is_empty() {
            debug!(events = cascaded.len(), "Updater edits not re-dispatched");
        }
        Ok(invoked)
    }
}
