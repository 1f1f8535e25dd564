//! Shared security primitives
//!
//! Owner-role access control and a composable pause switch, used by the
//! admin surface (token approval, fee schedule, mediator assignment) and by
//! the marketplace facade to gate state-changing operations.

use serde::{Deserialize, Serialize};

use types::ids::AccountId;

/// Single-owner access control.
///
/// The owner may mutate process-wide configuration and hand the role to a
/// successor. Everything else is a regular caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: AccountId,
}

impl AccessControl {
    /// Create access control with an initial owner.
    pub fn new(owner: AccountId) -> Self {
        Self { owner }
    }

    /// Check if a caller is the owner.
    pub fn is_owner(&self, caller: &AccountId) -> bool {
        *caller == self.owner
    }

    /// Transfer ownership. Returns `false` when the caller is not the owner.
    pub fn transfer_owner(&mut self, caller: &AccountId, new_owner: AccountId) -> bool {
        if !self.is_owner(caller) {
            return false;
        }
        self.owner = new_owner;
        true
    }

    /// Get the current owner.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }
}

/// Composable pause modifier.
///
/// When paused, protected operations must be rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseGuard {
    paused: bool,
}

impl PauseGuard {
    /// Create a new unpaused guard.
    pub fn new() -> Self {
        Self { paused: false }
    }

    /// Pause operations.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Unpause operations.
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Check if currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
