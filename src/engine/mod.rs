//! The roster engine.
//!
//! [`Solver::solve`] turns a [`RosterRequest`] into a [`RosterOutcome`]
//! through a fixed pipeline: validate, expand demand into slots, index
//! eligibility, search with backtracking, repair, balance, report.
//! Every stage is deterministic for a given request and seed.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{ConfigWarning, RosterError};
use crate::models::{
    expand_demand, LeaveBook, NameDirectory, PreferenceBook, RosterOutcome, RosterRequest,
    RuleSet, ShiftCatalog,
};
use crate::validation::validate_request;

mod balance;
mod constraints;
mod eligibility;
mod postprocess;
mod ranking;
mod report;
mod search;
mod state;

pub use balance::{BalanceReport, HourBalancer};
pub use constraints::{ConstraintEvaluator, RuleViolation};
pub use eligibility::EligibilityIndex;
pub use postprocess::{PostProcessor, RepairReport};
pub use ranking::{CandidateRanker, RankContext};
pub use search::{SearchLog, Searcher};
pub use state::{Ledger, RosterState};

/// Knobs that bound a solve without changing its semantics.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Search node budget; `None` is unbounded. Exhaustion aborts the
    /// run as infeasible.
    pub max_nodes: Option<u64>,
}

impl SolveOptions {
    /// Sets the search node budget.
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = Some(nodes);
        self
    }
}

/// The monthly duty-roster solver.
///
/// Holds the rule configuration and shift catalog; each call to
/// [`solve`](Self::solve) runs one independent request.
pub struct Solver {
    rules: RuleSet,
    catalog: ShiftCatalog,
    options: SolveOptions,
}

impl Solver {
    /// Creates a solver from rules and a shift catalog.
    pub fn new(rules: RuleSet, catalog: ShiftCatalog) -> Self {
        Self {
            rules,
            catalog,
            options: SolveOptions::default(),
        }
    }

    /// Sets the solve options.
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Produces a roster for the request.
    ///
    /// # Errors
    /// [`RosterError::InvalidInput`] when the request fails structural
    /// validation; [`RosterError::Infeasible`] when the search
    /// exhausts every candidate ordering (or its node budget) without
    /// covering the slots that have eligible staff. Coverage
    /// shortfalls alone never fail the run.
    pub fn solve(&self, request: &RosterRequest) -> Result<RosterOutcome, RosterError> {
        validate_request(request).map_err(RosterError::InvalidInput)?;

        let demand = expand_demand(&request.days, &request.demand, &self.catalog);
        let mut warnings = demand.warnings.clone();
        debug!(
            slots = demand.slots.len(),
            total_hours = demand.total_hours,
            "demand expanded"
        );

        let directory = NameDirectory::build(&request.staff, &request.aliases);
        let (prefs, pref_warnings) =
            PreferenceBook::resolve(&request.preferences, &directory);
        warnings.extend(pref_warnings);
        let leaves = LeaveBook::new(request.leaves.clone());

        for line in &request.demand {
            if !request.staff.iter().any(|s| s.qualifies_for(&line.role)) {
                let w = ConfigWarning::UnstaffedRole {
                    role: line.role.clone(),
                };
                if !warnings.contains(&w) {
                    warnings.push(w);
                }
            }
        }
        for w in &warnings {
            warn!(warning = %w, "run warning");
        }

        let eligibility = EligibilityIndex::build(
            &request.staff,
            &request.unavailable,
            &leaves,
            &prefs,
            &request.days,
        );

        let mut state =
            RosterState::new(request.staff.iter().map(|s| s.id.clone()));
        for s in &request.staff {
            let credit = leaves.credit_hours(&s.id);
            if credit > 0.0 {
                state.credit(&s.id, credit);
            }
        }

        let mut role_hours: BTreeMap<String, f64> = BTreeMap::new();
        for slot in &demand.slots {
            *role_hours.entry(slot.role.clone()).or_insert(0.0) += slot.hours;
        }
        let role_targets = report::compute_role_targets(&request.staff, &role_hours);
        let staff_targets =
            report::compute_targets(&request.staff, &self.rules, demand.total_hours);

        let evaluator = ConstraintEvaluator::new(&self.rules, &self.catalog);
        let ranker = CandidateRanker::new(request.seed);
        let rank_ctx = RankContext {
            catalog: &self.catalog,
            prefs: &prefs,
            role_targets: &role_targets,
            staff_targets: &staff_targets,
        };

        let searcher = Searcher {
            evaluator: &evaluator,
            eligibility: &eligibility,
            ranker: &ranker,
            leaves: &leaves,
            rank_ctx: &rank_ctx,
            max_nodes: self.options.max_nodes,
        };
        let mut log = SearchLog::default();
        if !searcher.run(&demand.slots, &mut state, &mut log) {
            return Err(RosterError::Infeasible {
                explored: log.explored,
            });
        }

        let post = PostProcessor {
            rules: &self.rules,
            catalog: &self.catalog,
            evaluator: &evaluator,
            eligibility: &eligibility,
            ranker: &ranker,
            prefs: &prefs,
            rank_ctx: &rank_ctx,
        };
        let repair = post.run(&demand.slots, &mut state);

        let balancer = HourBalancer {
            rules: &self.rules,
            catalog: &self.catalog,
            evaluator: &evaluator,
            eligibility: &eligibility,
        };
        let balance = balancer.run(&mut state);

        let mut assignments = state.assignments().to_vec();
        assignments.sort_by(|a, b| {
            (a.day, &a.role, &a.shift_code, &a.staff_id)
                .cmp(&(b.day, &b.role, &b.shift_code, &b.staff_id))
        });

        let outcome = RosterOutcome {
            hours_by_staff: report::hours_by_staff(&request.staff, &assignments),
            targets: staff_targets,
            overrides: log.overrides,
            removed_rest: repair.removed_rest,
            removed_cap: repair.removed_cap,
            removed_request: repair.removed_request,
            repair_fills: repair.fills,
            unfilled: repair.unfilled,
            transfers: balance.transfers,
            final_spread: balance.final_spread,
            request_stats: report::request_stats(&prefs, &assignments),
            warnings,
            explored: log.explored,
            assignments,
        };
        debug!(
            assignments = outcome.assignments.len(),
            unfilled = outcome.unfilled.len(),
            spread = outcome.final_spread,
            "solve finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::{
        DemandLine, LeaveKind, LeaveRecord, PreferenceAssertion, Shift, Staff, StaffKey,
    };
    use crate::validation::ValidationErrorKind;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn days(range: std::ops::Range<u32>) -> Vec<NaiveDate> {
        range.map(d).collect()
    }

    fn catalog() -> ShiftCatalog {
        ShiftCatalog::new()
            .with_shift(Shift::new("D", 8 * 60, 16 * 60))
            .with_shift(Shift::new("E", 14 * 60, 22 * 60))
            .with_shift(Shift::new("N", 20 * 60, 8 * 60))
            .with_shift(Shift::new("L", 8 * 60, 8 * 60).with_night(true))
    }

    fn ward_pair() -> Vec<Staff> {
        vec![
            Staff::new("a", "Ahn").with_role("ward"),
            Staff::new("b", "Bae").with_role("ward"),
        ]
    }

    #[test]
    fn test_round_the_clock_cover_alternates_staff() {
        // One 24-hour seat per day for three days, two staff, at most
        // one consecutive night: the only legal shape is alternation.
        let rules = RuleSet::default().with_max_consecutive_nights(1);
        let solver = Solver::new(rules, catalog());
        let request = RosterRequest::new(
            days(1..4),
            vec![DemandLine::new("ward", "L", 1)],
            ward_pair(),
        );

        let outcome = solver.solve(&request).unwrap();
        assert_eq!(outcome.assignments.len(), 3);
        assert!(outcome.unfilled.is_empty());
        for pair in outcome.assignments.windows(2) {
            assert_ne!(
                pair[0].staff_id, pair[1].staff_id,
                "same staff on adjacent 24-hour shifts"
            );
        }
    }

    #[test]
    fn test_hard_avoid_never_survives_the_run() {
        let solver = Solver::new(RuleSet::default(), catalog());
        let request = RosterRequest::new(
            days(1..6),
            vec![DemandLine::new("ward", "D", 1)],
            ward_pair(),
        )
        .with_preferences(vec![PreferenceAssertion::avoid(
            StaffKey::Id("a".into()),
            d(3),
        )]);

        let outcome = solver.solve(&request).unwrap();
        assert!(outcome
            .assignments_for_staff("a")
            .iter()
            .all(|a| a.day != d(3)));
        assert_eq!(outcome.request_stats.avoid_violated, 0);
        assert!(outcome.unfilled.is_empty());
    }

    #[test]
    fn test_unstaffed_role_is_partial_coverage_not_failure() {
        let solver = Solver::new(RuleSet::default(), catalog());
        let request = RosterRequest::new(
            days(1..3),
            vec![
                DemandLine::new("ward", "D", 1),
                DemandLine::new("icu", "D", 1),
            ],
            ward_pair(),
        );

        let outcome = solver.solve(&request).unwrap();
        assert_eq!(outcome.unfilled.len(), 2);
        assert!(outcome.unfilled.iter().all(|s| s.role == "icu"));
        assert!(outcome
            .warnings
            .contains(&ConfigWarning::UnstaffedRole { role: "icu".into() }));
        // The staffable half is fully covered.
        assert_eq!(outcome.assignments.len(), 2);
    }

    #[test]
    fn test_same_seed_same_roster() {
        let solver = Solver::new(RuleSet::default(), catalog());
        let staff = vec![
            Staff::new("a", "Ahn").with_role("ward"),
            Staff::new("b", "Bae").with_role("ward"),
            Staff::new("c", "Cho").with_role("ward"),
        ];
        let request = RosterRequest::new(
            days(1..11),
            vec![
                DemandLine::new("ward", "D", 1),
                DemandLine::new("ward", "E", 1),
            ],
            staff,
        )
        .with_seed(17);

        let first = solver.solve(&request).unwrap();
        let second = solver.solve(&request).unwrap();
        assert_eq!(first.assignments, second.assignments);
        assert_eq!(first.transfers, second.transfers);
    }

    #[test]
    fn test_invalid_input_reports_all_issues() {
        let solver = Solver::new(RuleSet::default(), catalog());
        let mut staff = ward_pair();
        staff.push(Staff::new("a", "Another Ahn").with_role("ward"));
        let request = RosterRequest::new(
            days(1..3),
            vec![DemandLine::new("ward", "D", 1)],
            staff,
        )
        .with_leaves(vec![LeaveRecord::new("ghost", d(1), LeaveKind::Block)]);

        let err = solver.solve(&request).unwrap_err();
        let RosterError::InvalidInput(errors) = err else {
            panic!("expected InvalidInput");
        };
        let kinds: Vec<_> = errors.iter().map(|e| e.kind.clone()).collect();
        assert!(kinds.contains(&ValidationErrorKind::DuplicateStaffId));
        assert!(kinds.contains(&ValidationErrorKind::UnknownStaff));
    }

    #[test]
    fn test_soft_block_override_is_logged() {
        // Both staff soft-blocked on every day; demand still needs one
        // of them daily, so pass 2 must override and log it.
        let solver = Solver::new(RuleSet::default(), catalog());
        let leaves = vec![
            LeaveRecord::new("a", d(1), LeaveKind::SoftBlock),
            LeaveRecord::new("b", d(1), LeaveKind::SoftBlock),
        ];
        let request = RosterRequest::new(
            days(1..2),
            vec![DemandLine::new("ward", "D", 1)],
            ward_pair(),
        )
        .with_leaves(leaves);

        let outcome = solver.solve(&request).unwrap();
        assert_eq!(outcome.assignments.len(), 1);
        assert_eq!(outcome.overrides.len(), 1);
        assert_eq!(outcome.overrides[0].day, d(1));
    }

    #[test]
    fn test_night_rest_never_survives_repair() {
        let rules = RuleSet::default();
        let solver = Solver::new(rules, catalog());
        let staff = vec![
            Staff::new("a", "Ahn").with_role("ward"),
            Staff::new("b", "Bae").with_role("ward"),
            Staff::new("c", "Cho").with_role("ward"),
        ];
        let request = RosterRequest::new(
            days(1..8),
            vec![
                DemandLine::new("ward", "N", 1),
                DemandLine::new("ward", "D", 1),
            ],
            staff,
        );

        let outcome = solver.solve(&request).unwrap();
        for a in &outcome.assignments {
            if a.shift_code != "N" {
                continue;
            }
            let next = a.day.succ_opt().unwrap();
            assert!(
                outcome
                    .assignments_for_staff(&a.staff_id)
                    .iter()
                    .all(|b| b.day != next),
                "{} works the day after a night shift",
                a.staff_id
            );
        }
    }

    #[test]
    fn test_node_budget_turns_runaway_search_infeasible() {
        let rules = RuleSet::default();
        let solver = Solver::new(rules, catalog())
            .with_options(SolveOptions::default().with_max_nodes(1));
        let request = RosterRequest::new(
            days(1..8),
            vec![DemandLine::new("ward", "D", 2)],
            ward_pair(),
        );

        let err = solver.solve(&request).unwrap_err();
        assert!(matches!(err, RosterError::Infeasible { .. }));
    }

    #[test]
    fn test_hours_and_targets_reported() {
        let solver = Solver::new(RuleSet::default(), catalog());
        let request = RosterRequest::new(
            days(1..5),
            vec![DemandLine::new("ward", "D", 1)],
            ward_pair(),
        );

        let outcome = solver.solve(&request).unwrap();
        let worked: f64 = outcome.hours_by_staff.values().sum();
        assert!((worked - 32.0).abs() < 1e-9);
        let targeted: f64 = outcome.targets.values().sum();
        assert!((targeted - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_balanced_hours_within_tolerance() {
        let rules = RuleSet::default().with_balance_tolerance(8.0);
        let solver = Solver::new(rules, catalog());
        let staff = vec![
            Staff::new("a", "Ahn").with_role("ward"),
            Staff::new("b", "Bae").with_role("ward"),
            Staff::new("c", "Cho").with_role("ward"),
        ];
        let request = RosterRequest::new(
            days(1..13),
            vec![DemandLine::new("ward", "D", 1)],
            staff,
        );

        let outcome = solver.solve(&request).unwrap();
        assert!(outcome.final_spread <= 8.0);
        let max = outcome.hours_by_staff.values().cloned().fold(0.0, f64::max);
        let min = outcome
            .hours_by_staff
            .values()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        assert!(max - min <= 8.0);
    }
}
