//! Rule configuration.
//!
//! A `RuleSet` is the merged hard/soft configuration for one run. It
//! is threaded explicitly through every engine call and never read
//! from shared process state; it is read-only once the run starts.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// A per-staff ceiling on assignments in an (area, shift, day-class)
/// bucket across the run — e.g. at most two weekend nights in the ICU
/// per person per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaQuota {
    /// Area (role label) the quota applies to.
    pub area: String,
    /// Shift code the quota applies to.
    pub shift_code: String,
    /// Whether the quota counts weekend days (true) or weekdays.
    pub weekend: bool,
    /// Maximum matching assignments per staff member.
    pub cap: u32,
}

/// A shift code banned on specific weekdays (e.g. no long shifts on
/// weekends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBan {
    /// Banned shift code.
    pub shift_code: String,
    /// Weekdays the ban covers.
    pub weekdays: Vec<Weekday>,
}

impl DayBan {
    /// Bans a shift code on Saturdays and Sundays.
    pub fn weekends(shift_code: impl Into<String>) -> Self {
        Self {
            shift_code: shift_code.into(),
            weekdays: vec![Weekday::Sat, Weekday::Sun],
        }
    }

    /// Whether the ban covers `weekday` for `code`.
    pub fn applies(&self, code: &str, weekday: Weekday) -> bool {
        self.shift_code == code && self.weekdays.contains(&weekday)
    }
}

/// Merged rule configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Maximum assignments per (day, staff) pair.
    pub max_per_day_per_person: u32,
    /// Weekly hour ceiling over Monday-start weeks; 0 disables.
    pub weekly_hour_ceiling: f64,
    /// Maximum consecutive nightish shifts; 0 disables.
    pub max_consecutive_nights: u32,
    /// Whether a nightish shift by itself mandates next-day rest.
    pub rest_after_night: bool,
    /// Base monthly target hours per full-time staff member. Targets
    /// are rescaled so they sum to the total required slot hours.
    pub monthly_target_hours: f64,
    /// Per-staff (area, shift, day-class) ceilings.
    pub area_quotas: Vec<AreaQuota>,
    /// Shift codes banned on specific weekdays.
    pub day_bans: Vec<DayBan>,
    /// Acceptable hour spread between the most- and least-loaded
    /// staff after balancing.
    pub balance_tolerance: f64,
    /// Iteration budget for the hour balancer.
    pub balance_iterations: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            max_per_day_per_person: 1,
            weekly_hour_ceiling: 0.0,
            max_consecutive_nights: 0,
            rest_after_night: true,
            monthly_target_hours: 160.0,
            area_quotas: Vec::new(),
            day_bans: Vec::new(),
            balance_tolerance: 8.0,
            balance_iterations: 200,
        }
    }
}

impl RuleSet {
    /// Sets the daily assignment cap.
    pub fn with_daily_cap(mut self, cap: u32) -> Self {
        self.max_per_day_per_person = cap;
        self
    }

    /// Sets the weekly hour ceiling (0 disables).
    pub fn with_weekly_ceiling(mut self, hours: f64) -> Self {
        self.weekly_hour_ceiling = hours;
        self
    }

    /// Sets the consecutive-night ceiling (0 disables).
    pub fn with_max_consecutive_nights(mut self, nights: u32) -> Self {
        self.max_consecutive_nights = nights;
        self
    }

    /// Sets whether nightish shifts mandate next-day rest.
    pub fn with_rest_after_night(mut self, rest: bool) -> Self {
        self.rest_after_night = rest;
        self
    }

    /// Sets the base monthly target hours.
    pub fn with_monthly_target(mut self, hours: f64) -> Self {
        self.monthly_target_hours = hours;
        self
    }

    /// Adds an area quota.
    pub fn with_area_quota(mut self, quota: AreaQuota) -> Self {
        self.area_quotas.push(quota);
        self
    }

    /// Adds a day ban.
    pub fn with_day_ban(mut self, ban: DayBan) -> Self {
        self.day_bans.push(ban);
        self
    }

    /// Sets the balance tolerance in hours.
    pub fn with_balance_tolerance(mut self, hours: f64) -> Self {
        self.balance_tolerance = hours;
        self
    }

    /// Sets the balancer iteration budget.
    pub fn with_balance_iterations(mut self, iterations: u32) -> Self {
        self.balance_iterations = iterations;
        self
    }
}
