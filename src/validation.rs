//! Input validation for roster runs.
//!
//! Checks structural integrity of the request before the engine runs.
//! Detects:
//! - Duplicate staff IDs
//! - Duplicate (role, shift) demand lines
//! - Leave, unavailability, alias, or ID-keyed preference records
//!   referencing unknown staff
//! - An empty calendar with non-empty demand
//!
//! Data issues a run can absorb — unknown shift codes, unstaffed
//! roles, unresolvable name keys — are deliberately *not* errors here;
//! they surface as `ConfigWarning`s in the outcome.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{RosterRequest, StaffKey};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two staff members share the same ID.
    DuplicateStaffId,
    /// Two demand lines share the same (role, shift) pair.
    DuplicateDemandLine,
    /// A record references a staff ID not on the roster.
    UnknownStaff,
    /// Demand exists but the calendar is empty.
    EmptyCalendar,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a roster request.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(request: &RosterRequest) -> ValidationResult {
    let mut errors = Vec::new();

    let mut staff_ids = HashSet::new();
    for s in &request.staff {
        if !staff_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateStaffId,
                format!("Duplicate staff ID: {}", s.id),
            ));
        }
    }

    let mut line_keys = HashSet::new();
    for line in &request.demand {
        if !line_keys.insert((line.role.as_str(), line.shift_code.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateDemandLine,
                format!(
                    "Duplicate demand line (role '{}', shift '{}')",
                    line.role, line.shift_code
                ),
            ));
        }
    }

    if request.days.is_empty() && !request.demand.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCalendar,
            "Demand lines given but the calendar is empty",
        ));
    }

    for leave in &request.leaves {
        if !staff_ids.contains(leave.staff_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStaff,
                format!("Leave record references unknown staff '{}'", leave.staff_id),
            ));
        }
    }

    for (staff_id, day) in &request.unavailable {
        if !staff_ids.contains(staff_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStaff,
                format!("Unavailability mark on {day} references unknown staff '{staff_id}'"),
            ));
        }
    }

    for (alias, staff_id) in &request.aliases {
        if !staff_ids.contains(staff_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStaff,
                format!("Alias '{alias}' maps to unknown staff '{staff_id}'"),
            ));
        }
    }

    for pref in &request.preferences {
        if let StaffKey::Id(id) = &pref.key {
            if !staff_ids.contains(id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownStaff,
                    format!("Preference references unknown staff '{id}'"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
