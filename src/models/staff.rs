//! Staff model.
//!
//! A staff member is identified by a stable ID and qualified for a set
//! of roles. Accumulated hour/role/weekday counters are engine-owned
//! (see `engine::state`) and are never stored on the staff record
//! itself — they mutate only through commit/uncommit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A rosterable staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    /// Unique staff identifier.
    pub id: String,
    /// Display name; also registered as a preference-matching alias.
    pub name: String,
    /// Roles this member may be assigned to.
    pub roles: BTreeSet<String>,
    /// Contract fraction scaling the monthly target (1.0 = full time).
    pub target_ratio: f64,
}

impl Staff {
    /// Creates a staff member with no role qualifications.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            roles: BTreeSet::new(),
            target_ratio: 1.0,
        }
    }

    /// Adds a role qualification.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Sets the contract fraction.
    pub fn with_target_ratio(mut self, ratio: f64) -> Self {
        self.target_ratio = ratio.max(0.0);
        self
    }

    /// Whether this member is qualified for `role`.
    pub fn qualifies_for(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
