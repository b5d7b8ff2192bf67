//! Backtracking slot assignment.
//!
//! Depth-first search over the ordered slot list, committing and
//! uncommitting slot by slot. Per slot, two ranked passes: the first
//! excludes staff under an applicable soft block; the second includes
//! them and logs an override for the chosen pairing. Success is
//! reaching the end of the list; exhaustion of both passes propagates
//! failure upward, and root exhaustion means the whole run is
//! infeasible — no partial roster is ever returned.
//!
//! A slot whose eligible set is empty from the outset is skipped, not
//! failed: the shortfall is gap repair's business and is reported as
//! partial coverage, never as infeasibility.
//!
//! Worst-case time is exponential; an optional node budget turns
//! runaway searches into infeasibility. The budget is checked only at
//! slot boundaries so state is never left half-applied.

use tracing::{debug, trace};

use super::constraints::ConstraintEvaluator;
use super::eligibility::EligibilityIndex;
use super::ranking::{CandidateRanker, RankContext};
use super::state::RosterState;
use crate::models::{Assignment, LeaveBook, OverrideRecord, Slot};

/// Search collaborators, borrowed for the duration of one run.
pub struct Searcher<'a> {
    pub evaluator: &'a ConstraintEvaluator<'a>,
    pub eligibility: &'a EligibilityIndex<'a>,
    pub ranker: &'a CandidateRanker,
    pub leaves: &'a LeaveBook,
    pub rank_ctx: &'a RankContext<'a>,
    pub max_nodes: Option<u64>,
}

/// What the search produced besides the committed state.
#[derive(Debug, Default)]
pub struct SearchLog {
    /// Soft-block overrides recorded during pass 2.
    pub overrides: Vec<OverrideRecord>,
    /// Slot visits, counted at slot boundaries.
    pub explored: u64,
}

impl<'a> Searcher<'a> {
    /// Runs the search over `slots` against `state`.
    ///
    /// Returns `true` on success with every reachable slot committed;
    /// `false` leaves `state` exactly as it was.
    pub fn run(&self, slots: &[Slot], state: &mut RosterState, log: &mut SearchLog) -> bool {
        let ok = self.assign(slots, 0, state, log);
        debug!(
            slots = slots.len(),
            explored = log.explored,
            overrides = log.overrides.len(),
            success = ok,
            "backtracking search finished"
        );
        ok
    }

    fn assign(
        &self,
        slots: &[Slot],
        index: usize,
        state: &mut RosterState,
        log: &mut SearchLog,
    ) -> bool {
        if index == slots.len() {
            return true;
        }
        log.explored += 1;
        if let Some(budget) = self.max_nodes {
            if log.explored > budget {
                return false;
            }
        }

        let slot = &slots[index];
        let eligible = self.candidate_pool(slot);
        if eligible.is_empty() {
            // Nobody is ever eligible; leave the seat for gap repair.
            trace!(day = %slot.day, shift = %slot.shift_code, "slot has no eligible staff, skipping");
            return self.assign(slots, index + 1, state, log);
        }

        let ranked = self.ranker.rank(eligible, slot, state, self.rank_ctx);

        // Pass 1: honor soft blocks. Pass 2: override and log them.
        for pass in 0..2 {
            for staff in &ranked {
                let soft_blocked = self.leaves.soft_blocked(staff, slot.day, &slot.shift_code);
                if pass == 0 && soft_blocked {
                    continue;
                }
                if self.evaluator.check(state, staff, slot).is_err() {
                    continue;
                }

                let assignment = Assignment::for_slot(slot, staff.clone());
                state.commit(assignment.clone());
                let logged_override = pass == 1 && soft_blocked;
                if logged_override {
                    log.overrides.push(OverrideRecord {
                        staff_id: staff.clone(),
                        day: slot.day,
                        shift_code: slot.shift_code.clone(),
                    });
                }

                if self.assign(slots, index + 1, state, log) {
                    return true;
                }

                state.uncommit(&assignment);
                if logged_override {
                    log.overrides.pop();
                }
            }
        }
        false
    }

    /// Eligible staff for a slot, narrowed by pin records.
    fn candidate_pool(&self, slot: &Slot) -> Vec<String> {
        let eligible = self.eligibility.candidates(slot);
        let pinned = self.leaves.pinned(slot.day, &slot.shift_code);
        if pinned.is_empty() {
            return eligible;
        }
        let narrowed: Vec<String> = eligible
            .iter()
            .filter(|id| pinned.contains(&id.as_str()))
            .cloned()
            .collect();
        // A pin naming nobody eligible must not strand the seat.
        if narrowed.is_empty() {
            eligible
        } else {
            narrowed
        }
    }
}
