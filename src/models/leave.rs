//! Leave records and their lookup book.
//!
//! A leave record modifies how its staff member may be used on one
//! day. Kinds map to distinct engine semantics: hard blocks remove the
//! member from eligibility, soft blocks are honored in the first search
//! pass and overridable (logged) in the second, credits count toward
//! the monthly target without occupying a seat, and pins force a seat
//! toward a specific member when the shift matches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What a leave record means to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LeaveKind {
    /// Approved absence: never assignable that day.
    Block,
    /// Requested off: excluded in pass 1, overridable in pass 2.
    SoftBlock,
    /// Counts as worked hours toward the monthly target
    /// (e.g. training, secondment) without occupying a seat.
    Credit {
        /// Hours credited.
        hours: f64,
    },
    /// Not assignable on the first day of the run (e.g. came off a
    /// night shift in the previous month).
    FirstDayBlock,
    /// Forces matching seats on this day toward this member; applies
    /// only when the seat's shift code matches.
    Pin,
}

/// A dated leave record for one staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRecord {
    /// Staff the record applies to.
    pub staff_id: String,
    /// Day the record applies to.
    pub day: NaiveDate,
    /// Engine semantics.
    pub kind: LeaveKind,
    /// Restricts the record to one shift code; `None` is day-wide.
    pub shift_code: Option<String>,
}

impl LeaveRecord {
    /// Creates a day-wide leave record.
    pub fn new(staff_id: impl Into<String>, day: NaiveDate, kind: LeaveKind) -> Self {
        Self {
            staff_id: staff_id.into(),
            day,
            kind,
            shift_code: None,
        }
    }

    /// Restricts the record to a shift code.
    pub fn with_shift(mut self, code: impl Into<String>) -> Self {
        self.shift_code = Some(code.into());
        self
    }

    fn matches_shift(&self, code: &str) -> bool {
        match &self.shift_code {
            None => true,
            Some(c) => c == code,
        }
    }
}

/// Leave records indexed for engine queries.
#[derive(Debug, Clone, Default)]
pub struct LeaveBook {
    records: Vec<LeaveRecord>,
}

impl LeaveBook {
    /// Builds the book from raw records.
    pub fn new(records: Vec<LeaveRecord>) -> Self {
        Self { records }
    }

    /// Whether `staff` is hard-blocked on `day`.
    pub fn hard_blocked(&self, staff: &str, day: NaiveDate) -> bool {
        self.records.iter().any(|r| {
            r.staff_id == staff && r.day == day && matches!(r.kind, LeaveKind::Block)
        })
    }

    /// Whether a soft block applies to (`staff`, `day`, `shift`).
    pub fn soft_blocked(&self, staff: &str, day: NaiveDate, shift_code: &str) -> bool {
        self.records.iter().any(|r| {
            r.staff_id == staff
                && r.day == day
                && matches!(r.kind, LeaveKind::SoftBlock)
                && r.matches_shift(shift_code)
        })
    }

    /// Whether `staff` carries a first-day block.
    pub fn first_day_blocked(&self, staff: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.staff_id == staff && matches!(r.kind, LeaveKind::FirstDayBlock))
    }

    /// Staff pinned to seats on (`day`, `shift`), in record order.
    pub fn pinned(&self, day: NaiveDate, shift_code: &str) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| {
                r.day == day && matches!(r.kind, LeaveKind::Pin) && r.matches_shift(shift_code)
            })
            .map(|r| r.staff_id.as_str())
            .collect()
    }

    /// Total credited hours for `staff` across the run.
    pub fn credit_hours(&self, staff: &str) -> f64 {
        self.records
            .iter()
            .filter(|r| r.staff_id == staff)
            .filter_map(|r| match r.kind {
                LeaveKind::Credit { hours } => Some(hours),
                _ => None,
            })
            .sum()
    }

    /// The underlying records.
    pub fn records(&self) -> &[LeaveRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_hard_block() {
        let book = LeaveBook::new(vec![LeaveRecord::new("s1", d(5), LeaveKind::Block)]);
        assert!(book.hard_blocked("s1", d(5)));
        assert!(!book.hard_blocked("s1", d(6)));
        assert!(!book.hard_blocked("s2", d(5)));
    }

    #[test]
    fn test_soft_block_shift_scoping() {
        let book = LeaveBook::new(vec![
            LeaveRecord::new("s1", d(5), LeaveKind::SoftBlock).with_shift("N"),
            LeaveRecord::new("s2", d(5), LeaveKind::SoftBlock),
        ]);
        assert!(book.soft_blocked("s1", d(5), "N"));
        assert!(!book.soft_blocked("s1", d(5), "D"));
        // Day-wide soft block hits every shift.
        assert!(book.soft_blocked("s2", d(5), "D"));
        assert!(book.soft_blocked("s2", d(5), "N"));
    }

    #[test]
    fn test_pin() {
        let book = LeaveBook::new(vec![
            LeaveRecord::new("s1", d(5), LeaveKind::Pin).with_shift("N"),
        ]);
        assert_eq!(book.pinned(d(5), "N"), vec!["s1"]);
        assert!(book.pinned(d(5), "D").is_empty());
        assert!(book.pinned(d(6), "N").is_empty());
    }

    #[test]
    fn test_credit_hours() {
        let book = LeaveBook::new(vec![
            LeaveRecord::new("s1", d(3), LeaveKind::Credit { hours: 8.0 }),
            LeaveRecord::new("s1", d(4), LeaveKind::Credit { hours: 4.0 }),
            LeaveRecord::new("s2", d(3), LeaveKind::Credit { hours: 6.0 }),
        ]);
        assert!((book.credit_hours("s1") - 12.0).abs() < 1e-10);
        assert!((book.credit_hours("s2") - 6.0).abs() < 1e-10);
        assert_eq!(book.credit_hours("s3"), 0.0);
    }

    #[test]
    fn test_first_day_block() {
        let book = LeaveBook::new(vec![LeaveRecord::new("s1", d(1), LeaveKind::FirstDayBlock)]);
        assert!(book.first_day_blocked("s1"));
        assert!(!book.first_day_blocked("s2"));
    }
}
