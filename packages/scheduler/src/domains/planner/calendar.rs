//! Calendar math for the weekly planner.

use chrono::{Datelike, Duration, NaiveDate};

/// The Monday that starts the upcoming week.
///
/// A Monday input rolls a full week forward rather than returning the input
/// day, so re-running the planner mid-week can never double-book the week
/// already in flight.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    // Monday = 0 .. Sunday = 6
    let weekday = today.weekday().num_days_from_monday() as i64;
    let days_ahead = if weekday == 0 { 7 } else { 7 - weekday };
    today + Duration::days(days_ahead)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monday_rolls_a_full_week_forward() {
        // 2026-08-17 is a Monday
        assert_eq!(next_monday(date(2026, 8, 17)), date(2026, 8, 24));
    }

    #[test]
    fn midweek_days_roll_to_the_upcoming_monday() {
        assert_eq!(next_monday(date(2026, 8, 18)), date(2026, 8, 24)); // Tuesday
        assert_eq!(next_monday(date(2026, 8, 21)), date(2026, 8, 24)); // Friday
        assert_eq!(next_monday(date(2026, 8, 23)), date(2026, 8, 24)); // Sunday
    }

    #[test]
    fn result_is_always_a_monday_within_seven_days() {
        let start = date(2026, 8, 10);
        for offset in 0..14 {
            let day = start + Duration::days(offset);
            let monday = next_monday(day);
            assert_eq!(monday.weekday(), Weekday::Mon);
            assert!(monday > day);
            assert!(monday <= day + Duration::days(7));
        }
    }
}
