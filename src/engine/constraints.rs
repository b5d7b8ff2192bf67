//! Hard-rule evaluation.
//!
//! Pure predicates over a tentative placement and the committed
//! state. Checks run in fixed precedence and the first failure
//! short-circuits:
//!
//! 1. Daily cap for (day, staff)
//! 2. Same-day time overlap (wrapping shifts clipped at midnight)
//! 3. Day ban (shift code banned on the weekday)
//! 4. Weekly hour ceiling (Monday-start week, candidate included)
//! 5. Previous-day interaction (mandated rest, restricted follow-ons)
//! 6. Consecutive-night ceiling
//! 7. Area quota ceiling
//!
//! All seven are hard. Soft handling — the two-pass soft-block
//! relaxation — lives one layer up in the search.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::state::RosterState;
use crate::models::calendar::is_weekend;
use crate::models::{RuleSet, Shift, ShiftCatalog, Slot};

/// Why a tentative placement was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleViolation {
    /// The (day, staff) assignment cap is already reached.
    DailyCap,
    /// The shift overlaps an already-committed same-day interval.
    Overlap,
    /// The shift code is banned on this weekday.
    DayBan,
    /// The Monday-start week would exceed the hour ceiling.
    WeeklyCeiling,
    /// Yesterday's shift mandates rest today.
    RestRequired,
    /// Yesterday's shift does not allow this code to follow.
    NotAllowedNext,
    /// Adding tonight would exceed the consecutive-night ceiling.
    ConsecutiveNights,
    /// The (area, shift, day-class) quota is already reached.
    AreaQuota,
}

/// Evaluates the seven hard rules for one run.
#[derive(Debug)]
pub struct ConstraintEvaluator<'a> {
    rules: &'a RuleSet,
    catalog: &'a ShiftCatalog,
}

impl<'a> ConstraintEvaluator<'a> {
    /// Creates an evaluator over a rule set and shift catalog.
    pub fn new(rules: &'a RuleSet, catalog: &'a ShiftCatalog) -> Self {
        Self { rules, catalog }
    }

    /// Tests placing `staff` into `slot` against the committed state.
    ///
    /// Returns the first violated rule in precedence order.
    pub fn check(
        &self,
        state: &RosterState,
        staff: &str,
        slot: &Slot,
    ) -> Result<(), RuleViolation> {
        self.check_daily_cap(state, staff, slot.day)?;
        self.check_overlap(state, staff, slot)?;
        self.check_day_ban(slot)?;
        self.check_weekly_ceiling(state, staff, slot)?;
        self.check_previous_day(state, staff, slot)?;
        self.check_consecutive_nights(state, staff, slot)?;
        self.check_area_quota(state, staff, slot)?;
        Ok(())
    }

    fn check_daily_cap(
        &self,
        state: &RosterState,
        staff: &str,
        day: NaiveDate,
    ) -> Result<(), RuleViolation> {
        if state.count_on(staff, day) + 1 > self.rules.max_per_day_per_person {
            return Err(RuleViolation::DailyCap);
        }
        Ok(())
    }

    fn check_overlap(
        &self,
        state: &RosterState,
        staff: &str,
        slot: &Slot,
    ) -> Result<(), RuleViolation> {
        let Some(shift) = self.catalog.get(&slot.shift_code) else {
            // Unknown code has no interval; nothing to overlap.
            return Ok(());
        };
        for committed in state.assignments_on(staff, slot.day) {
            if let Some(other) = self.catalog.get(&committed.shift_code) {
                if shift.overlaps_today(other) {
                    return Err(RuleViolation::Overlap);
                }
            }
        }
        Ok(())
    }

    fn check_day_ban(&self, slot: &Slot) -> Result<(), RuleViolation> {
        let weekday = slot.day.weekday();
        if self
            .rules
            .day_bans
            .iter()
            .any(|ban| ban.applies(&slot.shift_code, weekday))
        {
            return Err(RuleViolation::DayBan);
        }
        Ok(())
    }

    fn check_weekly_ceiling(
        &self,
        state: &RosterState,
        staff: &str,
        slot: &Slot,
    ) -> Result<(), RuleViolation> {
        if self.rules.weekly_hour_ceiling <= 0.0 {
            return Ok(());
        }
        if state.week_hours(staff, slot.day) + slot.hours > self.rules.weekly_hour_ceiling {
            return Err(RuleViolation::WeeklyCeiling);
        }
        Ok(())
    }

    fn check_previous_day(
        &self,
        state: &RosterState,
        staff: &str,
        slot: &Slot,
    ) -> Result<(), RuleViolation> {
        let Some(yesterday) = slot.day.pred_opt() else {
            return Ok(());
        };
        for committed in state.assignments_on(staff, yesterday) {
            let Some(shift) = self.catalog.get(&committed.shift_code) else {
                continue;
            };
            if mandates_rest(shift, self.rules.rest_after_night) {
                return Err(RuleViolation::RestRequired);
            }
            if !shift.allows_next(&slot.shift_code) {
                return Err(RuleViolation::NotAllowedNext);
            }
        }
        Ok(())
    }

    fn check_consecutive_nights(
        &self,
        state: &RosterState,
        staff: &str,
        slot: &Slot,
    ) -> Result<(), RuleViolation> {
        if self.rules.max_consecutive_nights == 0 {
            return Ok(());
        }
        let nightish = self
            .catalog
            .get(&slot.shift_code)
            .map(Shift::is_nightish)
            .unwrap_or(false);
        if !nightish {
            return Ok(());
        }

        // Count backward through consecutive nightish days.
        let mut run: u32 = 0;
        let mut day = slot.day.pred_opt();
        while let Some(d) = day {
            let worked_night = state.assignments_on(staff, d).iter().any(|a| {
                self.catalog
                    .get(&a.shift_code)
                    .map(Shift::is_nightish)
                    .unwrap_or(false)
            });
            if !worked_night {
                break;
            }
            run += 1;
            day = d.pred_opt();
        }

        if run + 1 > self.rules.max_consecutive_nights {
            return Err(RuleViolation::ConsecutiveNights);
        }
        Ok(())
    }

    fn check_area_quota(
        &self,
        state: &RosterState,
        staff: &str,
        slot: &Slot,
    ) -> Result<(), RuleViolation> {
        let weekend = is_weekend(slot.day);
        for quota in &self.rules.area_quotas {
            if quota.area == slot.role
                && quota.shift_code == slot.shift_code
                && quota.weekend == weekend
                && state.area_count(staff, &quota.area, &quota.shift_code, weekend) >= quota.cap
            {
                return Err(RuleViolation::AreaQuota);
            }
        }
        Ok(())
    }
}

/// Whether working `shift` yesterday mandates rest today.
pub(crate) fn mandates_rest(shift: &Shift, rest_after_night: bool) -> bool {
    shift.rest_after_hours >= 24 || (rest_after_night && shift.is_nightish())
}
