//! Calendar helpers.
//!
//! Rostering is day-granular: a run covers an explicit list of
//! `NaiveDate`s (normally one calendar month). Weeks start on Monday
//! for the weekly hour ceiling; Saturday and Sunday count as weekend
//! for day bans and area quotas.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// The Monday that starts the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Whether `day` falls on a weekend (Saturday or Sunday).
pub fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All days of a calendar month, in order.
///
/// Returns `None` for an invalid year/month pair.
pub fn month_days(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let mut days = Vec::with_capacity(31);
    let mut day = first;
    while day.month() == month {
        days.push(day);
        day = day.succ_opt()?;
    }
    Some(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-03-06 is a Wednesday; its week starts 2024-03-04.
        assert_eq!(week_start(d(2024, 3, 6)), d(2024, 3, 4));
        // A Monday is its own week start.
        assert_eq!(week_start(d(2024, 3, 4)), d(2024, 3, 4));
        // Sunday belongs to the preceding Monday's week.
        assert_eq!(week_start(d(2024, 3, 10)), d(2024, 3, 4));
    }

    #[test]
    fn test_is_weekend() {
        assert!(is_weekend(d(2024, 3, 9))); // Saturday
        assert!(is_weekend(d(2024, 3, 10))); // Sunday
        assert!(!is_weekend(d(2024, 3, 8))); // Friday
    }

    #[test]
    fn test_month_days() {
        let feb = month_days(2024, 2).unwrap();
        assert_eq!(feb.len(), 29); // Leap year
        assert_eq!(feb[0], d(2024, 2, 1));
        assert_eq!(*feb.last().unwrap(), d(2024, 2, 29));

        let apr = month_days(2023, 4).unwrap();
        assert_eq!(apr.len(), 30);

        assert!(month_days(2024, 13).is_none());
    }
}
