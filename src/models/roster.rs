//! Roster solution model: assignments, the run request, and the
//! outcome with its diagnostics.
//!
//! An [`Assignment`] is the only mutable roster unit; the engine
//! commits and uncommits them symmetrically. The [`RosterOutcome`]
//! carries the final assignment list plus everything removed, filled,
//! overridden, or left short along the way — an imperfect roster with
//! honest diagnostics beats an aborted run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{calendar, DemandLine, LeaveRecord, PreferenceAssertion, Slot, Staff};
use crate::error::ConfigWarning;

/// One committed seat: a staff member on a (day, role, shift).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Calendar day.
    pub day: NaiveDate,
    /// Role label.
    pub role: String,
    /// Shift code.
    pub shift_code: String,
    /// Assigned staff ID.
    pub staff_id: String,
    /// Hours the seat is worth.
    pub hours: f64,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(
        day: NaiveDate,
        role: impl Into<String>,
        shift_code: impl Into<String>,
        staff_id: impl Into<String>,
        hours: f64,
    ) -> Self {
        Self {
            day,
            role: role.into(),
            shift_code: shift_code.into(),
            staff_id: staff_id.into(),
            hours,
        }
    }

    /// Builds the assignment that fills `slot` with `staff`.
    pub fn for_slot(slot: &Slot, staff_id: impl Into<String>) -> Self {
        Self::new(slot.day, &slot.role, &slot.shift_code, staff_id, slot.hours)
    }
}

/// A pass-2 pairing that went through despite an applicable soft block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    /// Overridden staff ID.
    pub staff_id: String,
    /// Day of the pairing.
    pub day: NaiveDate,
    /// Shift of the pairing.
    pub shift_code: String,
}

/// One hour-balancing move: an assignment handed from the most- to a
/// less-loaded staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// Donor staff ID.
    pub from: String,
    /// Receiver staff ID.
    pub to: String,
    /// Day of the moved assignment.
    pub day: NaiveDate,
    /// Shift of the moved assignment.
    pub shift_code: String,
    /// Hours moved.
    pub hours: f64,
}

/// Aggregate request-satisfaction statistics for the final roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStats {
    /// Hard avoids with no surviving matching assignment.
    pub avoid_honored: u32,
    /// Hard avoids still matched by a surviving assignment.
    pub avoid_violated: u32,
    /// Soft prefers matched by a surviving assignment.
    pub prefer_met: u32,
    /// Soft prefers with no matching assignment.
    pub prefer_unmet: u32,
}

/// Everything the engine consumes for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterRequest {
    /// Calendar days, in order (normally one month).
    pub days: Vec<NaiveDate>,
    /// Demand lines.
    pub demand: Vec<DemandLine>,
    /// Staff roster with role qualifications.
    pub staff: Vec<Staff>,
    /// Externally marked unavailability: (staff ID, day).
    pub unavailable: Vec<(String, NaiveDate)>,
    /// Leave records.
    pub leaves: Vec<LeaveRecord>,
    /// Preference assertions (ID-keyed and name-keyed).
    pub preferences: Vec<PreferenceAssertion>,
    /// Extra name aliases: (alias, staff ID).
    pub aliases: Vec<(String, String)>,
    /// Seed for the deterministic ranking tiebreak.
    pub seed: u64,
}

impl RosterRequest {
    /// Creates a request from calendar, demand, and staff.
    pub fn new(days: Vec<NaiveDate>, demand: Vec<DemandLine>, staff: Vec<Staff>) -> Self {
        Self {
            days,
            demand,
            staff,
            ..Self::default()
        }
    }

    /// Creates a request covering one calendar month.
    ///
    /// Returns `None` for an invalid year/month pair.
    pub fn for_month(
        year: i32,
        month: u32,
        demand: Vec<DemandLine>,
        staff: Vec<Staff>,
    ) -> Option<Self> {
        Some(Self::new(calendar::month_days(year, month)?, demand, staff))
    }

    /// Sets external unavailability marks.
    pub fn with_unavailable(mut self, unavailable: Vec<(String, NaiveDate)>) -> Self {
        self.unavailable = unavailable;
        self
    }

    /// Sets leave records.
    pub fn with_leaves(mut self, leaves: Vec<LeaveRecord>) -> Self {
        self.leaves = leaves;
        self
    }

    /// Sets preference assertions.
    pub fn with_preferences(mut self, preferences: Vec<PreferenceAssertion>) -> Self {
        self.preferences = preferences;
        self
    }

    /// Sets name aliases.
    pub fn with_aliases(mut self, aliases: Vec<(String, String)>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Sets the tiebreak seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// The result of a successful run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterOutcome {
    /// Final assignments, sorted by (day, role, shift, staff).
    pub assignments: Vec<Assignment>,
    /// Worked hours per staff member (credits excluded).
    pub hours_by_staff: BTreeMap<String, f64>,
    /// Rescaled target hours per staff member.
    pub targets: BTreeMap<String, f64>,
    /// Soft-block overrides logged during pass 2.
    pub overrides: Vec<OverrideRecord>,
    /// Assignments removed by rest enforcement.
    pub removed_rest: Vec<Assignment>,
    /// Assignments removed by daily-cap enforcement.
    pub removed_cap: Vec<Assignment>,
    /// Assignments removed by request reconciliation.
    pub removed_request: Vec<Assignment>,
    /// Assignments added by gap repair.
    pub repair_fills: Vec<Assignment>,
    /// Seats still unfilled after repair (partial coverage).
    pub unfilled: Vec<Slot>,
    /// Hour-balancing moves.
    pub transfers: Vec<Transfer>,
    /// Hour spread between the most- and least-loaded staff after
    /// balancing; above tolerance means balancing ran out of moves.
    pub final_spread: f64,
    /// Request-satisfaction statistics.
    pub request_stats: RequestStats,
    /// Non-fatal data issues found during the run.
    pub warnings: Vec<ConfigWarning>,
    /// Search nodes visited.
    pub explored: u64,
}

impl RosterOutcome {
    /// All assignments for a staff member.
    pub fn assignments_for_staff(&self, staff_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.staff_id == staff_id)
            .collect()
    }

    /// All assignments on a day.
    pub fn assignments_on(&self, day: NaiveDate) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| a.day == day).collect()
    }

    /// Whether every seat was covered.
    pub fn full_coverage(&self) -> bool {
        self.unfilled.is_empty()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}
