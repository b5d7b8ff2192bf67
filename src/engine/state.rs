//! Committed roster state.
//!
//! `RosterState` is the single mutable structure of a run: the
//! committed assignment list plus per-staff ledgers (hours, role
//! hours, weekday counts). Every commit has an exact inverse uncommit
//! that reverts all derived counters; a leaked counter would silently
//! corrupt every downstream heuristic, so the pair is kept symmetric
//! and exercised as such in tests.

use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};

use crate::models::calendar::{is_weekend, week_start};
use crate::models::Assignment;

/// Per-staff accumulated counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    /// Total hours, including leave credits seeded at run start.
    pub hours: f64,
    /// Hours per role.
    pub role_hours: HashMap<String, f64>,
    /// Assignment count per weekday (Monday = 0).
    pub weekday_counts: [u32; 7],
    /// Total assignment count.
    pub assignments: u32,
}

/// The committed assignments and counters of one in-flight run.
#[derive(Debug, Clone, Default)]
pub struct RosterState {
    assignments: Vec<Assignment>,
    ledgers: BTreeMap<String, Ledger>,
}

impl RosterState {
    /// Creates a state with an empty ledger per staff member.
    pub fn new(staff_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            assignments: Vec::new(),
            ledgers: staff_ids
                .into_iter()
                .map(|id| (id, Ledger::default()))
                .collect(),
        }
    }

    /// Seeds credited hours (leave that counts as worked).
    pub fn credit(&mut self, staff: &str, hours: f64) {
        if let Some(ledger) = self.ledgers.get_mut(staff) {
            ledger.hours += hours;
        }
    }

    /// Commits an assignment, updating every derived counter.
    pub fn commit(&mut self, assignment: Assignment) {
        let ledger = self
            .ledgers
            .entry(assignment.staff_id.clone())
            .or_default();
        ledger.hours += assignment.hours;
        *ledger
            .role_hours
            .entry(assignment.role.clone())
            .or_insert(0.0) += assignment.hours;
        ledger.weekday_counts
            [assignment.day.weekday().num_days_from_monday() as usize] += 1;
        ledger.assignments += 1;
        self.assignments.push(assignment);
    }

    /// Uncommits an assignment: the exact inverse of [`commit`].
    ///
    /// Returns `false` if the assignment is not committed.
    ///
    /// [`commit`]: RosterState::commit
    pub fn uncommit(&mut self, assignment: &Assignment) -> bool {
        let Some(pos) = self.assignments.iter().rposition(|a| a == assignment) else {
            return false;
        };
        self.assignments.remove(pos);
        if let Some(ledger) = self.ledgers.get_mut(&assignment.staff_id) {
            ledger.hours -= assignment.hours;
            if let Some(role_hours) = ledger.role_hours.get_mut(&assignment.role) {
                *role_hours -= assignment.hours;
            }
            ledger.weekday_counts
                [assignment.day.weekday().num_days_from_monday() as usize] -= 1;
            ledger.assignments -= 1;
        }
        true
    }

    /// All committed assignments, in commit order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Assignments for (`day`, `staff`).
    pub fn assignments_on(&self, staff: &str, day: NaiveDate) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.staff_id == staff && a.day == day)
            .collect()
    }

    /// Assignment count for (`day`, `staff`).
    pub fn count_on(&self, staff: &str, day: NaiveDate) -> u32 {
        self.assignments_on(staff, day).len() as u32
    }

    /// Sum of assignment hours for `staff` in the Monday-start week
    /// containing `day`.
    pub fn week_hours(&self, staff: &str, day: NaiveDate) -> f64 {
        let ws = week_start(day);
        self.assignments
            .iter()
            .filter(|a| a.staff_id == staff && week_start(a.day) == ws)
            .map(|a| a.hours)
            .sum()
    }

    /// Total accumulated hours for `staff` (credits included).
    pub fn hours(&self, staff: &str) -> f64 {
        self.ledgers.get(staff).map(|l| l.hours).unwrap_or(0.0)
    }

    /// Accumulated hours for `staff` in `role`.
    pub fn role_hours(&self, staff: &str, role: &str) -> f64 {
        self.ledgers
            .get(staff)
            .and_then(|l| l.role_hours.get(role))
            .copied()
            .unwrap_or(0.0)
    }

    /// Prior assignment count for `staff` on the weekday of `day`.
    pub fn weekday_count(&self, staff: &str, day: NaiveDate) -> u32 {
        self.ledgers
            .get(staff)
            .map(|l| l.weekday_counts[day.weekday().num_days_from_monday() as usize])
            .unwrap_or(0)
    }

    /// Total assignment count for `staff`.
    pub fn assignment_count(&self, staff: &str) -> u32 {
        self.ledgers.get(staff).map(|l| l.assignments).unwrap_or(0)
    }

    /// Assignments for `staff` in an (area, shift, day-class) bucket.
    pub fn area_count(&self, staff: &str, area: &str, shift_code: &str, weekend: bool) -> u32 {
        self.assignments
            .iter()
            .filter(|a| {
                a.staff_id == staff
                    && a.role == area
                    && a.shift_code == shift_code
                    && is_weekend(a.day) == weekend
            })
            .count() as u32
    }

    /// Ledger for one staff member, if known.
    pub fn ledger(&self, staff: &str) -> Option<&Ledger> {
        self.ledgers.get(staff)
    }

    /// Staff IDs with a ledger, in sorted order.
    pub fn staff_ids(&self) -> impl Iterator<Item = &str> {
        self.ledgers.keys().map(String::as_str)
    }

    /// (staff, hours) loads sorted ascending by hours, ID on ties.
    pub fn loads(&self) -> Vec<(&str, f64)> {
        let mut loads: Vec<(&str, f64)> = self
            .ledgers
            .iter()
            .map(|(id, l)| (id.as_str(), l.hours))
            .collect();
        loads.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        loads
    }

    /// Hour spread between the most- and least-loaded staff.
    pub fn spread(&self) -> f64 {
        let loads = self.loads();
        match (loads.first(), loads.last()) {
            (Some(min), Some(max)) => max.1 - min.1,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn state() -> RosterState {
        RosterState::new(["s1".to_string(), "s2".to_string()])
    }

    #[test]
    fn test_commit_updates_counters() {
        let mut s = state();
        s.commit(Assignment::new(d(4), "nurse", "D", "s1", 8.0)); // Monday

        assert_eq!(s.assignments().len(), 1);
        assert!((s.hours("s1") - 8.0).abs() < 1e-10);
        assert!((s.role_hours("s1", "nurse") - 8.0).abs() < 1e-10);
        assert_eq!(s.weekday_count("s1", d(11)), 1); // Next Monday
        assert_eq!(s.assignment_count("s1"), 1);
        assert_eq!(s.count_on("s1", d(4)), 1);
    }

    #[test]
    fn test_uncommit_is_exact_inverse() {
        let mut s = state();
        let before = s.clone();

        let a = Assignment::new(d(4), "nurse", "D", "s1", 8.0);
        s.commit(a.clone());
        assert!(s.uncommit(&a));

        assert_eq!(s.assignments(), before.assignments());
        assert_eq!(s.ledger("s1"), before.ledger("s1"));
        assert_eq!(s.ledger("s2"), before.ledger("s2"));
    }

    #[test]
    fn test_uncommit_missing_returns_false() {
        let mut s = state();
        let a = Assignment::new(d(4), "nurse", "D", "s1", 8.0);
        assert!(!s.uncommit(&a));
    }

    #[test]
    fn test_week_hours_monday_start() {
        let mut s = state();
        // 2024-03-04 is a Monday; 03-10 is the Sunday of the same week.
        s.commit(Assignment::new(d(4), "nurse", "D", "s1", 8.0));
        s.commit(Assignment::new(d(10), "nurse", "D", "s1", 8.0));
        // 03-11 starts the next week.
        s.commit(Assignment::new(d(11), "nurse", "D", "s1", 8.0));

        assert!((s.week_hours("s1", d(6)) - 16.0).abs() < 1e-10);
        assert!((s.week_hours("s1", d(11)) - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_credit_counts_toward_hours_only() {
        let mut s = state();
        s.credit("s1", 12.0);
        assert!((s.hours("s1") - 12.0).abs() < 1e-10);
        assert_eq!(s.assignment_count("s1"), 0);
        assert_eq!(s.week_hours("s1", d(4)), 0.0);
    }

    #[test]
    fn test_area_count_weekend_split() {
        let mut s = state();
        s.commit(Assignment::new(d(9), "icu", "N", "s1", 12.0)); // Saturday
        s.commit(Assignment::new(d(11), "icu", "N", "s1", 12.0)); // Monday

        assert_eq!(s.area_count("s1", "icu", "N", true), 1);
        assert_eq!(s.area_count("s1", "icu", "N", false), 1);
        assert_eq!(s.area_count("s1", "icu", "D", true), 0);
    }

    #[test]
    fn test_loads_and_spread() {
        let mut s = state();
        s.commit(Assignment::new(d(4), "nurse", "D", "s1", 8.0));
        s.commit(Assignment::new(d(4), "nurse", "N", "s2", 12.0));
        s.commit(Assignment::new(d(5), "nurse", "D", "s1", 8.0));

        let loads = s.loads();
        assert_eq!(loads[0].0, "s2");
        assert_eq!(loads[1].0, "s1");
        assert!((s.spread() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_loads_tie_breaks_by_id() {
        let s = state();
        let loads = s.loads();
        assert_eq!(loads[0].0, "s1");
        assert_eq!(loads[1].0, "s2");
    }
}
