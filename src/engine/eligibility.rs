//! Eligibility resolution.
//!
//! Maintains the role → staff index and answers, for a (staff, day,
//! shift) query, whether the member is out of play: externally marked
//! unavailable, on hard-block leave, first-day blocked, or covered by
//! a hard avoid assertion. The static role index can be widened with
//! staff who have already worked a role at least once — the hour
//! balancer uses that to find transfer receivers.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::state::RosterState;
use crate::models::{LeaveBook, PreferenceBook, Slot, Staff};

/// The per-run eligibility index.
#[derive(Debug)]
pub struct EligibilityIndex<'a> {
    by_role: BTreeMap<String, BTreeSet<String>>,
    blocked: HashSet<(String, NaiveDate)>,
    prefs: &'a PreferenceBook,
}

impl<'a> EligibilityIndex<'a> {
    /// Builds the index.
    ///
    /// `blocked` merges external unavailability marks, hard-block
    /// leave, and first-day blocks applied to the first run day.
    pub fn build(
        staff: &[Staff],
        unavailable: &[(String, NaiveDate)],
        leaves: &LeaveBook,
        prefs: &'a PreferenceBook,
        days: &[NaiveDate],
    ) -> Self {
        let mut by_role: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for s in staff {
            for role in &s.roles {
                by_role.entry(role.clone()).or_default().insert(s.id.clone());
            }
        }

        let mut blocked: HashSet<(String, NaiveDate)> = unavailable.iter().cloned().collect();
        for record in leaves.records() {
            if matches!(record.kind, crate::models::LeaveKind::Block) {
                blocked.insert((record.staff_id.clone(), record.day));
            }
        }
        if let Some(&first_day) = days.first() {
            for s in staff {
                if leaves.first_day_blocked(&s.id) {
                    blocked.insert((s.id.clone(), first_day));
                }
            }
        }

        Self {
            by_role,
            blocked,
            prefs,
        }
    }

    /// Statically qualified staff for `role`, in ID order.
    pub fn qualified(&self, role: &str) -> Vec<&str> {
        self.by_role
            .get(role)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether `staff` is out of play on `day`.
    pub fn is_blocked(&self, staff: &str, day: NaiveDate) -> bool {
        self.blocked.contains(&(staff.to_string(), day))
    }

    /// Whether a hard avoid covers (`staff`, `day`, `shift`).
    pub fn hard_avoid(&self, staff: &str, day: NaiveDate, shift_code: &str) -> bool {
        self.prefs.hard_avoid(staff, day, shift_code)
    }

    /// Candidates for a slot: qualified, not blocked, no hard avoid.
    pub fn candidates(&self, slot: &Slot) -> Vec<String> {
        self.qualified(&slot.role)
            .into_iter()
            .filter(|id| !self.is_blocked(id, slot.day))
            .filter(|id| !self.hard_avoid(id, slot.day, &slot.shift_code))
            .map(str::to_string)
            .collect()
    }

    /// Qualified staff widened with anyone who has already worked
    /// `role` at least once, in ID order.
    pub fn qualified_with_history(&self, role: &str, state: &RosterState) -> Vec<String> {
        let mut ids: BTreeSet<String> = self
            .qualified(role)
            .into_iter()
            .map(str::to_string)
            .collect();
        for id in state.staff_ids() {
            if state.role_hours(id, role) > 0.0 {
                ids.insert(id.to_string());
            }
        }
        ids.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Assignment, LeaveKind, LeaveRecord, NameDirectory, PreferenceAssertion, StaffKey,
    };

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn roster() -> Vec<Staff> {
        vec![
            Staff::new("s1", "Kim").with_role("nurse"),
            Staff::new("s2", "Lee").with_role("nurse").with_role("icu"),
            Staff::new("s3", "Park").with_role("icu"),
        ]
    }

    fn slot(day: NaiveDate, role: &str, code: &str) -> Slot {
        Slot {
            day,
            role: role.into(),
            shift_code: code.into(),
            hours: 8.0,
            ordinal: 0,
        }
    }

    #[test]
    fn test_role_index() {
        let staff = roster();
        let leaves = LeaveBook::default();
        let prefs = PreferenceBook::default();
        let index = EligibilityIndex::build(&staff, &[], &leaves, &prefs, &[d(1)]);

        assert_eq!(index.qualified("nurse"), vec!["s1", "s2"]);
        assert_eq!(index.qualified("icu"), vec!["s2", "s3"]);
        assert!(index.qualified("surgeon").is_empty());
    }

    #[test]
    fn test_blocked_merges_sources() {
        let staff = roster();
        let leaves = LeaveBook::new(vec![
            LeaveRecord::new("s2", d(5), LeaveKind::Block),
            LeaveRecord::new("s3", d(2), LeaveKind::FirstDayBlock),
        ]);
        let prefs = PreferenceBook::default();
        let unavailable = vec![("s1".to_string(), d(4))];
        let index =
            EligibilityIndex::build(&staff, &unavailable, &leaves, &prefs, &[d(1), d(2)]);

        assert!(index.is_blocked("s1", d(4)));
        assert!(index.is_blocked("s2", d(5)));
        // First-day block lands on the first run day only.
        assert!(index.is_blocked("s3", d(1)));
        assert!(!index.is_blocked("s3", d(2)));
        assert!(!index.is_blocked("s1", d(5)));
    }

    #[test]
    fn test_candidates_filter_blocked_and_avoid() {
        let staff = roster();
        let leaves = LeaveBook::new(vec![LeaveRecord::new("s1", d(5), LeaveKind::Block)]);
        let dir = NameDirectory::build(&staff, &[]);
        let (prefs, _) = PreferenceBook::resolve(
            &[PreferenceAssertion::avoid(StaffKey::Id("s2".into()), d(5))],
            &dir,
        );
        let index = EligibilityIndex::build(&staff, &[], &leaves, &prefs, &[d(1)]);

        // s1 blocked, s2 hard-avoided → nobody left for nurse on day 5.
        assert!(index.candidates(&slot(d(5), "nurse", "D")).is_empty());
        // Both fine on day 6.
        assert_eq!(index.candidates(&slot(d(6), "nurse", "D")), vec!["s1", "s2"]);
    }

    #[test]
    fn test_widening_with_history() {
        let staff = roster();
        let leaves = LeaveBook::default();
        let prefs = PreferenceBook::default();
        let index = EligibilityIndex::build(&staff, &[], &leaves, &prefs, &[d(1)]);

        let mut state = RosterState::new(staff.iter().map(|s| s.id.clone()));
        // s1 is not statically qualified for icu but has worked it.
        state.commit(Assignment::new(d(1), "icu", "D", "s1", 8.0));

        assert_eq!(index.qualified("icu"), vec!["s2", "s3"]);
        assert_eq!(
            index.qualified_with_history("icu", &state),
            vec!["s1", "s2", "s3"]
        );
    }
}
