//! Shift definitions and the shift catalog.
//!
//! A shift is a named time-of-day span. The end may be at or before
//! the start, meaning the shift wraps past midnight; wrapping shifts
//! and very long shifts are "nightish" and subject to rest rules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minutes in a day.
pub const DAY_MIN: i32 = 1440;

/// Nightish threshold: shifts at least this long count as nightish
/// even when they do not wrap past midnight.
const NIGHTISH_MIN: i32 = 16 * 60;

/// A shift definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Shift code, unique within the catalog (e.g. "D", "N", "24h").
    pub code: String,
    /// Start, minutes from midnight (0..1440).
    pub start_min: i32,
    /// End, minutes from midnight. `end_min <= start_min` wraps past
    /// midnight into the next day.
    pub end_min: i32,
    /// Explicit nightish flag. `None` derives it from wrap/duration.
    pub night: Option<bool>,
    /// Hours of rest required after working this shift. A value of 24
    /// or more clears the whole next day.
    pub rest_after_hours: u32,
    /// When set, only these shift codes may follow on the next day.
    pub allowed_next: Option<Vec<String>>,
    /// Shift codes that are discouraged (not forbidden) on the next
    /// day; a soft ranking penalty.
    pub avoid_next: Vec<String>,
}

impl Shift {
    /// Creates a shift spanning `start_min..end_min`.
    pub fn new(code: impl Into<String>, start_min: i32, end_min: i32) -> Self {
        Self {
            code: code.into(),
            start_min,
            end_min,
            night: None,
            rest_after_hours: 0,
            allowed_next: None,
            avoid_next: Vec::new(),
        }
    }

    /// Sets the explicit nightish flag.
    pub fn with_night(mut self, night: bool) -> Self {
        self.night = Some(night);
        self
    }

    /// Sets the post-shift rest requirement in hours.
    pub fn with_rest_after(mut self, hours: u32) -> Self {
        self.rest_after_hours = hours;
        self
    }

    /// Restricts which shift codes may follow on the next day.
    pub fn with_allowed_next(mut self, codes: Vec<String>) -> Self {
        self.allowed_next = Some(codes);
        self
    }

    /// Adds a discouraged next-day shift code.
    pub fn with_avoid_next(mut self, code: impl Into<String>) -> Self {
        self.avoid_next.push(code.into());
        self
    }

    /// Whether the shift wraps past midnight.
    #[inline]
    pub fn wraps(&self) -> bool {
        self.end_min <= self.start_min
    }

    /// Duration in minutes. A wrap from a time back to the same time
    /// is a full 24 hours.
    pub fn duration_min(&self) -> i32 {
        if self.wraps() {
            DAY_MIN - self.start_min + self.end_min
        } else {
            self.end_min - self.start_min
        }
    }

    /// Duration in hours.
    pub fn duration_hours(&self) -> f64 {
        f64::from(self.duration_min()) / 60.0
    }

    /// Nightish: explicitly flagged, wrapping past midnight, or
    /// lasting at least 16 hours.
    pub fn is_nightish(&self) -> bool {
        match self.night {
            Some(flag) => flag,
            None => self.wraps() || self.duration_min() >= NIGHTISH_MIN,
        }
    }

    /// The occupied interval within the shift's own day, in minutes.
    ///
    /// Wrapping shifts are clipped at midnight; the portion past
    /// midnight belongs to the rest rules, not to same-day overlap.
    pub fn interval_today(&self) -> (i32, i32) {
        if self.wraps() {
            (self.start_min, DAY_MIN)
        } else {
            (self.start_min, self.end_min)
        }
    }

    /// Whether this shift's same-day interval overlaps another's.
    pub fn overlaps_today(&self, other: &Shift) -> bool {
        let (a0, a1) = self.interval_today();
        let (b0, b1) = other.interval_today();
        a0 < b1 && b0 < a1
    }

    /// Whether `code` may follow this shift on the next day.
    ///
    /// Unrestricted shifts allow everything.
    pub fn allows_next(&self, code: &str) -> bool {
        match &self.allowed_next {
            None => true,
            Some(allowed) => allowed.iter().any(|c| c == code),
        }
    }

    /// Whether `code` is discouraged on the day after this shift.
    pub fn avoids_next(&self, code: &str) -> bool {
        self.avoid_next.iter().any(|c| c == code)
    }
}

/// Shift definitions keyed by code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftCatalog {
    shifts: HashMap<String, Shift>,
}

impl ShiftCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from definitions. Later duplicates win.
    pub fn from_shifts(shifts: impl IntoIterator<Item = Shift>) -> Self {
        let mut catalog = Self::new();
        for shift in shifts {
            catalog.add(shift);
        }
        catalog
    }

    /// Adds or replaces a definition.
    pub fn add(&mut self, shift: Shift) {
        self.shifts.insert(shift.code.clone(), shift);
    }

    /// Builder: adds a definition and returns self.
    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.add(shift);
        self
    }

    /// Looks up a definition by code.
    pub fn get(&self, code: &str) -> Option<&Shift> {
        self.shifts.get(code)
    }

    /// Hours for a code; 0.0 for unknown codes.
    pub fn hours(&self, code: &str) -> f64 {
        self.get(code).map(Shift::duration_hours).unwrap_or(0.0)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_shift() {
        let s = Shift::new("D", 8 * 60, 16 * 60);
        assert!(!s.wraps());
        assert_eq!(s.duration_min(), 480);
        assert!((s.duration_hours() - 8.0).abs() < 1e-10);
        assert!(!s.is_nightish());
        assert_eq!(s.interval_today(), (480, 960));
    }

    #[test]
    fn test_night_shift_wraps() {
        let s = Shift::new("N", 20 * 60, 8 * 60);
        assert!(s.wraps());
        assert_eq!(s.duration_min(), 720);
        assert!(s.is_nightish());
        // Clipped at midnight for same-day overlap.
        assert_eq!(s.interval_today(), (1200, DAY_MIN));
    }

    #[test]
    fn test_full_day_shift() {
        let s = Shift::new("24h", 8 * 60, 8 * 60);
        assert!(s.wraps());
        assert_eq!(s.duration_min(), DAY_MIN);
        assert!(s.is_nightish());
    }

    #[test]
    fn test_long_day_shift_is_nightish() {
        // 06:00–22:00 = 16h, no wrap, still nightish.
        let s = Shift::new("L", 6 * 60, 22 * 60);
        assert!(!s.wraps());
        assert!(s.is_nightish());
    }

    #[test]
    fn test_explicit_night_flag_wins() {
        let s = Shift::new("E", 14 * 60, 22 * 60).with_night(true);
        assert!(s.is_nightish());
        let t = Shift::new("X", 20 * 60, 8 * 60).with_night(false);
        assert!(!t.is_nightish());
    }

    #[test]
    fn test_overlap() {
        let d = Shift::new("D", 8 * 60, 16 * 60);
        let e = Shift::new("E", 14 * 60, 22 * 60);
        let n = Shift::new("N", 20 * 60, 8 * 60);
        assert!(d.overlaps_today(&e));
        assert!(e.overlaps_today(&n));
        assert!(!d.overlaps_today(&n));
    }

    #[test]
    fn test_adjacent_shifts_do_not_overlap() {
        let d = Shift::new("D", 8 * 60, 16 * 60);
        let e = Shift::new("E", 16 * 60, 22 * 60);
        assert!(!d.overlaps_today(&e));
    }

    #[test]
    fn test_allowed_next() {
        let s = Shift::new("N", 20 * 60, 8 * 60).with_allowed_next(vec!["OFF".into()]);
        assert!(s.allows_next("OFF"));
        assert!(!s.allows_next("D"));

        let unrestricted = Shift::new("D", 8 * 60, 16 * 60);
        assert!(unrestricted.allows_next("N"));
    }

    #[test]
    fn test_avoid_next() {
        let s = Shift::new("E", 14 * 60, 22 * 60).with_avoid_next("D");
        assert!(s.avoids_next("D"));
        assert!(!s.avoids_next("E"));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = ShiftCatalog::new()
            .with_shift(Shift::new("D", 8 * 60, 16 * 60))
            .with_shift(Shift::new("N", 20 * 60, 8 * 60));

        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("D").is_some());
        assert!(catalog.get("X").is_none());
        assert!((catalog.hours("D") - 8.0).abs() < 1e-10);
        assert!((catalog.hours("X") - 0.0).abs() < 1e-10);
    }
}
