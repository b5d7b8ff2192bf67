//! Error and warning types.
//!
//! Only [`RosterError::Infeasible`] aborts a run. Data issues that do
//! not prevent producing a usable roster are collected as
//! [`ConfigWarning`]s and reported in the outcome; coverage shortfalls
//! and incomplete balancing are reported through the outcome itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationError;

/// A whole-run failure.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The backtracking search exhausted every candidate at the root
    /// slot, or the node budget ran out. No partial roster is returned.
    #[error("no feasible roster exists for the given demand ({explored} nodes explored)")]
    Infeasible {
        /// Search nodes visited before giving up.
        explored: u64,
    },

    /// Input failed structural validation before the run started.
    #[error("input validation failed with {} issue(s)", .0.len())]
    InvalidInput(Vec<ValidationError>),
}

/// A non-fatal data issue detected during a run.
///
/// Warnings are logged via `tracing` and returned in the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ConfigWarning {
    /// A demand line references a shift code absent from the catalog.
    /// Its slots are emitted with zero hours.
    #[error("demand line for role '{role}' references unknown shift code '{code}'")]
    UnknownShift { role: String, code: String },

    /// A demand line never requires anyone (all counts zero).
    #[error("demand line (role '{role}', shift '{code}') requires no one")]
    EmptyDemandLine { role: String, code: String },

    /// A preference assertion keyed by name matched no staff member
    /// or registered alias; it is ignored.
    #[error("preference name key '{name}' matched no staff member")]
    UnresolvedName { name: String },

    /// A demand line names a role no staff member is qualified for.
    /// Its slots can only end up as coverage shortfall.
    #[error("no staff member is qualified for role '{role}'")]
    UnstaffedRole { role: String },
}
