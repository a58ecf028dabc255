use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use std::ops::Range;

const COMMUTE_DAYS: [Weekday; 3] = [Weekday::Tue, Weekday::Wed, Weekday::Thu];
const COMMUTE_HOURS: Range<u32> = 7..10;

/// A journey counts as a commute when it was completed (has an end time) and started
/// on a Tuesday, Wednesday or Thursday between 07:00 and 09:59.
/// Anything that does not parse as `YYYY-MM-DD HH:MM` is simply not a commute.
pub fn is_commute(date: &str, start_time: &str, end_time: &str) -> bool {
    if end_time.is_empty() {
        return false;
    }

    let Ok(started) =
        NaiveDateTime::parse_from_str(&format!("{date} {start_time}"), "%Y-%m-%d %H:%M")
    else {
        return false;
    };

    COMMUTE_DAYS.contains(&started.weekday()) && COMMUTE_HOURS.contains(&started.hour())
}
