//! Greedy pairwise hour balancing.
//!
//! After repair, spreads total hours by moving single assignments from
//! the most-loaded staff member to the least-loaded one that can take
//! them. One transfer per iteration, up to the configured iteration
//! budget, stopping early once the max-min spread falls within
//! tolerance or no legal move improves it.
//!
//! A move is legal only when the receiver qualifies for the role
//! (including through prior history in it), is not blocked that day,
//! has no hard avoid on the seat, does not already hold the same
//! (day, role, shift), passes every hard rule, strictly improves the
//! donor/receiver pair, and does not push the receiver past the role's
//! fair share.

use std::collections::BTreeMap;

use tracing::debug;

use super::constraints::{mandates_rest, ConstraintEvaluator};
use super::eligibility::EligibilityIndex;
use super::state::RosterState;
use crate::models::{Assignment, RuleSet, ShiftCatalog, Slot, Transfer};

/// What the balancer did.
#[derive(Debug, Default)]
pub struct BalanceReport {
    /// Applied moves, in order.
    pub transfers: Vec<Transfer>,
    /// Max-min hour spread after the final move.
    pub final_spread: f64,
}

/// Balancing collaborators, borrowed for one run.
pub struct HourBalancer<'a> {
    pub rules: &'a RuleSet,
    pub catalog: &'a ShiftCatalog,
    pub evaluator: &'a ConstraintEvaluator<'a>,
    pub eligibility: &'a EligibilityIndex<'a>,
}

impl<'a> HourBalancer<'a> {
    /// Runs the balancing loop to completion.
    pub fn run(&self, state: &mut RosterState) -> BalanceReport {
        let mut report = BalanceReport::default();
        let role_targets = self.role_fair_shares(state);

        for _ in 0..self.rules.balance_iterations {
            if state.spread() <= self.rules.balance_tolerance {
                break;
            }
            match self.best_move(state, &role_targets) {
                Some(transfer) => {
                    self.apply(state, &transfer);
                    report.transfers.push(transfer);
                }
                None => break,
            }
        }

        report.final_spread = state.spread();
        debug!(
            transfers = report.transfers.len(),
            spread = report.final_spread,
            "balancing finished"
        );
        report
    }

    /// Fair share per role: the role's committed hours split over the
    /// staff who ever worked it.
    fn role_fair_shares(&self, state: &RosterState) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for a in state.assignments() {
            *totals.entry(a.role.clone()).or_insert(0.0) += a.hours;
        }
        totals
            .into_iter()
            .map(|(role, total)| {
                let used = state
                    .staff_ids()
                    .filter(|id| state.role_hours(id, &role) > 0.0)
                    .count()
                    .max(1);
                (role, total / used as f64)
            })
            .collect()
    }

    /// Picks the first legal move from the most-loaded donor to the
    /// least-loaded receiver that can take it.
    fn best_move(
        &self,
        state: &RosterState,
        role_targets: &BTreeMap<String, f64>,
    ) -> Option<Transfer> {
        let loads = state.loads();
        let (donor, donor_hours) = {
            let &(id, hours) = loads.last()?;
            (id.to_string(), hours)
        };

        // Donor assignments, largest seats first so one move closes as
        // much of the gap as possible.
        let mut movable: Vec<Assignment> = state
            .assignments()
            .iter()
            .filter(|a| a.staff_id == donor && a.hours > 0.0)
            .cloned()
            .collect();
        movable.sort_by(|a, b| {
            b.hours
                .partial_cmp(&a.hours)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| (a.day, &a.shift_code).cmp(&(b.day, &b.shift_code)))
        });

        for (receiver, receiver_hours) in &loads {
            if *receiver == donor {
                continue;
            }
            for a in &movable {
                // Strict improvement for the pair.
                if receiver_hours + a.hours >= donor_hours {
                    continue;
                }
                if self.accepts(state, receiver, a, role_targets) {
                    return Some(Transfer {
                        from: donor.clone(),
                        to: receiver.to_string(),
                        day: a.day,
                        shift_code: a.shift_code.clone(),
                        hours: a.hours,
                    });
                }
            }
        }
        None
    }

    fn accepts(
        &self,
        state: &RosterState,
        receiver: &str,
        a: &Assignment,
        role_targets: &BTreeMap<String, f64>,
    ) -> bool {
        if !self
            .eligibility
            .qualified_with_history(&a.role, state)
            .iter()
            .any(|id| id == receiver)
        {
            return false;
        }
        if self.eligibility.is_blocked(receiver, a.day) {
            return false;
        }
        if self.eligibility.hard_avoid(receiver, a.day, &a.shift_code) {
            return false;
        }
        if state.assignments().iter().any(|b| {
            b.staff_id == receiver
                && b.day == a.day
                && b.role == a.role
                && b.shift_code == a.shift_code
        }) {
            return false;
        }
        if let Some(&target) = role_targets.get(&a.role) {
            if state.role_hours(receiver, &a.role) + a.hours > target {
                return false;
            }
        }
        // The hard rules look backward only; a moved rest-mandating
        // shift must also not collide with the receiver's next day.
        if let Some(shift) = self.catalog.get(&a.shift_code) {
            if mandates_rest(shift, self.rules.rest_after_night) {
                if let Some(next) = a.day.succ_opt() {
                    if !state.assignments_on(receiver, next).is_empty() {
                        return false;
                    }
                }
            }
        }
        let slot = Slot {
            day: a.day,
            role: a.role.clone(),
            shift_code: a.shift_code.clone(),
            hours: a.hours,
            ordinal: 0,
        };
        self.evaluator.check(state, receiver, &slot).is_ok()
    }

    fn apply(&self, state: &mut RosterState, transfer: &Transfer) {
        let Some(old) = state
            .assignments()
            .iter()
            .find(|a| {
                a.staff_id == transfer.from
                    && a.day == transfer.day
                    && a.shift_code == transfer.shift_code
            })
            .cloned()
        else {
            return;
        };
        state.uncommit(&old);
        state.commit(Assignment::new(
            old.day,
            &old.role,
            &old.shift_code,
            &transfer.to,
            old.hours,
        ));
    }
}
