//! Demand lines and slot expansion.
//!
//! A demand line is a recurring (role, shift) requirement with a
//! headcount; expansion crosses the calendar with the demand lines and
//! emits one slot per required seat. Expansion is the sole source of
//! slots and is deterministic: identical inputs always produce an
//! identical slot list and ordering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ShiftCatalog;
use crate::error::ConfigWarning;

/// A recurring (role, shift) staffing requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandLine {
    /// Role label the seat requires (e.g. "nurse", "icu").
    pub role: String,
    /// Shift code from the catalog.
    pub shift_code: String,
    /// Required headcount on days without an override.
    pub default_count: i32,
    /// Day-specific headcount overrides.
    pub overrides: BTreeMap<NaiveDate, i32>,
}

impl DemandLine {
    /// Creates a demand line with a default headcount.
    pub fn new(role: impl Into<String>, shift_code: impl Into<String>, count: i32) -> Self {
        Self {
            role: role.into(),
            shift_code: shift_code.into(),
            default_count: count,
            overrides: BTreeMap::new(),
        }
    }

    /// Overrides the headcount for a specific day.
    pub fn with_override(mut self, day: NaiveDate, count: i32) -> Self {
        self.overrides.insert(day, count);
        self
    }

    /// Required headcount on `day`. Negative counts clamp to zero.
    pub fn count_on(&self, day: NaiveDate) -> i32 {
        self.overrides
            .get(&day)
            .copied()
            .unwrap_or(self.default_count)
            .max(0)
    }
}

/// One atomic staffing requirement: a seat on a (day, role, shift).
///
/// Slots carry no identity beyond their generating tuple plus an
/// ordinal disambiguating headcounts above one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Calendar day.
    pub day: NaiveDate,
    /// Role label.
    pub role: String,
    /// Shift code.
    pub shift_code: String,
    /// Hours the seat is worth; 0.0 for unknown shift codes.
    pub hours: f64,
    /// Seat index within the (day, role, shift) group.
    pub ordinal: u32,
}

/// Expanded demand: the ordered slot list plus the total required hours.
#[derive(Debug, Clone, Default)]
pub struct Demand {
    /// Slots in generation order: day-major, line-minor, ordinal-last.
    pub slots: Vec<Slot>,
    /// Sum of slot hours across the whole run.
    pub total_hours: f64,
    /// Non-fatal issues found while expanding.
    pub warnings: Vec<ConfigWarning>,
}

/// Expands demand lines over the calendar into the ordered slot list.
///
/// For each day × line, emits `count` slot copies. Unknown shift codes
/// yield zero-hour slots and an [`ConfigWarning::UnknownShift`];
/// lines that never require anyone are flagged but harmless.
pub fn expand_demand(days: &[NaiveDate], lines: &[DemandLine], catalog: &ShiftCatalog) -> Demand {
    let mut demand = Demand::default();

    for line in lines {
        if catalog.get(&line.shift_code).is_none() {
            demand.warnings.push(ConfigWarning::UnknownShift {
                role: line.role.clone(),
                code: line.shift_code.clone(),
            });
        }
        let total: i32 = days.iter().map(|&d| line.count_on(d)).sum();
        if total == 0 {
            demand.warnings.push(ConfigWarning::EmptyDemandLine {
                role: line.role.clone(),
                code: line.shift_code.clone(),
            });
        }
    }

    for &day in days {
        for line in lines {
            let hours = catalog.hours(&line.shift_code);
            for ordinal in 0..line.count_on(day) as u32 {
                demand.slots.push(Slot {
                    day,
                    role: line.role.clone(),
                    shift_code: line.shift_code.clone(),
                    hours,
                    ordinal,
                });
                demand.total_hours += hours;
            }
        }
    }

    demand
}
