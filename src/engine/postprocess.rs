//! Repair passes over a successful search result.
//!
//! Runs unconditionally after the search, in fixed order:
//!
//! 1. **Rest enforcement** — nightish shifts and shifts requiring
//!    ≥ 24 h of rest clear the same staff's next calendar day.
//! 2. **Daily-cap enforcement** — (day, staff) groups beyond the cap
//!    keep their earliest-starting assignments and lose the rest.
//! 3. **Gap repair** — recomputes demand vs. supply per (day, role,
//!    shift) and greedily fills shortfalls with ranked, non-violating,
//!    non-duplicate candidates; no backtracking, first acceptable
//!    candidate per seat wins, and seats may stay unfilled.
//! 4. **Request reconciliation** — removes assignments matching a
//!    hard avoid, then repeats gap repair once.
//!
//! Every removal and fill is retained as a diagnostic. A shortfall is
//! partial coverage, never a failure.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use super::constraints::{mandates_rest, ConstraintEvaluator};
use super::eligibility::EligibilityIndex;
use super::ranking::{CandidateRanker, RankContext};
use super::state::RosterState;
use crate::models::{Assignment, PreferenceBook, RuleSet, ShiftCatalog, Slot};

/// What the repair passes changed.
#[derive(Debug, Default)]
pub struct RepairReport {
    /// Removed by rest enforcement.
    pub removed_rest: Vec<Assignment>,
    /// Removed by daily-cap enforcement.
    pub removed_cap: Vec<Assignment>,
    /// Removed by request reconciliation.
    pub removed_request: Vec<Assignment>,
    /// Added by gap repair.
    pub fills: Vec<Assignment>,
    /// Seats still short after the final repair.
    pub unfilled: Vec<Slot>,
}

/// Repair-pass collaborators, borrowed for one run.
pub struct PostProcessor<'a> {
    pub rules: &'a RuleSet,
    pub catalog: &'a ShiftCatalog,
    pub evaluator: &'a ConstraintEvaluator<'a>,
    pub eligibility: &'a EligibilityIndex<'a>,
    pub ranker: &'a CandidateRanker,
    pub prefs: &'a PreferenceBook,
    pub rank_ctx: &'a RankContext<'a>,
}

impl<'a> PostProcessor<'a> {
    /// Runs all four passes against the committed state.
    pub fn run(&self, slots: &[Slot], state: &mut RosterState) -> RepairReport {
        let mut report = RepairReport::default();

        self.enforce_rest(state, &mut report);
        self.enforce_daily_cap(state, &mut report);
        self.repair_gaps(slots, state, &mut report);
        self.reconcile_requests(state, &mut report);
        // The final repair recomputes the shortfall from scratch.
        report.unfilled.clear();
        self.repair_gaps(slots, state, &mut report);

        debug!(
            removed_rest = report.removed_rest.len(),
            removed_cap = report.removed_cap.len(),
            removed_request = report.removed_request.len(),
            fills = report.fills.len(),
            unfilled = report.unfilled.len(),
            "repair passes finished"
        );
        report
    }

    /// Clears the day after any assignment whose shift mandates rest.
    fn enforce_rest(&self, state: &mut RosterState, report: &mut RepairReport) {
        let snapshot = sorted_snapshot(state);
        for a in snapshot {
            let Some(shift) = self.catalog.get(&a.shift_code) else {
                continue;
            };
            if !mandates_rest(shift, self.rules.rest_after_night) {
                continue;
            }
            let Some(next_day) = a.day.succ_opt() else {
                continue;
            };
            let next: Vec<Assignment> = state
                .assignments_on(&a.staff_id, next_day)
                .into_iter()
                .cloned()
                .collect();
            for b in next {
                if state.uncommit(&b) {
                    report.removed_rest.push(b);
                }
            }
        }
    }

    /// Trims (day, staff) groups beyond the cap, keeping the
    /// earliest-starting assignments.
    fn enforce_daily_cap(&self, state: &mut RosterState, report: &mut RepairReport) {
        let cap = self.rules.max_per_day_per_person as usize;
        let mut groups: BTreeMap<(NaiveDate, String), Vec<Assignment>> = BTreeMap::new();
        for a in sorted_snapshot(state) {
            groups
                .entry((a.day, a.staff_id.clone()))
                .or_default()
                .push(a);
        }
        for (_, mut group) in groups {
            if group.len() <= cap {
                continue;
            }
            group.sort_by(|a, b| {
                let start = |x: &Assignment| {
                    self.catalog.get(&x.shift_code).map(|s| s.start_min).unwrap_or(0)
                };
                start(a).cmp(&start(b)).then_with(|| a.shift_code.cmp(&b.shift_code))
            });
            for b in group.split_off(cap) {
                if state.uncommit(&b) {
                    report.removed_cap.push(b);
                }
            }
        }
    }

    /// Fills (day, role, shift) shortfalls greedily, ranked as in the
    /// search, without backtracking.
    fn repair_gaps(&self, slots: &[Slot], state: &mut RosterState, report: &mut RepairReport) {
        for slot in slots {
            let supply = state
                .assignments()
                .iter()
                .filter(|a| {
                    a.day == slot.day && a.role == slot.role && a.shift_code == slot.shift_code
                })
                .count() as u32;
            // Seats are revisited once per ordinal, so each shortfall
            // seat is attempted exactly once.
            if supply > slot.ordinal {
                continue;
            }
            if !self.fill_seat(slot, state, report) {
                report.unfilled.push(slot.clone());
            }
        }
    }

    fn fill_seat(&self, slot: &Slot, state: &mut RosterState, report: &mut RepairReport) -> bool {
        let candidates: Vec<String> = self
            .eligibility
            .candidates(slot)
            .into_iter()
            .filter(|id| {
                // Non-duplicate: never the same seat twice.
                !state.assignments().iter().any(|a| {
                    a.staff_id == *id
                        && a.day == slot.day
                        && a.role == slot.role
                        && a.shift_code == slot.shift_code
                })
            })
            .collect();
        let ranked = self.ranker.rank(candidates, slot, state, self.rank_ctx);
        for staff in ranked {
            if self.evaluator.check(state, &staff, slot).is_ok() {
                let assignment = Assignment::for_slot(slot, staff);
                state.commit(assignment.clone());
                report.fills.push(assignment);
                return true;
            }
        }
        false
    }

    /// Removes assignments a hard avoid covers.
    fn reconcile_requests(&self, state: &mut RosterState, report: &mut RepairReport) {
        for a in sorted_snapshot(state) {
            if self.prefs.hard_avoid(&a.staff_id, a.day, &a.shift_code)
                && state.uncommit(&a)
            {
                report.removed_request.push(a);
            }
        }
    }
}

/// Deterministically ordered copy of the committed assignments.
fn sorted_snapshot(state: &RosterState) -> Vec<Assignment> {
    let mut snapshot: Vec<Assignment> = state.assignments().to_vec();
    snapshot.sort_by(|a, b| {
        (a.day, &a.role, &a.shift_code, &a.staff_id)
            .cmp(&(b.day, &b.role, &b.shift_code, &b.staff_id))
    });
    snapshot
}
