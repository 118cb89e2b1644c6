//! Calendar-day helpers.
//!
//! Days are `NaiveDate`s: plain local calendar fields with no time-of-day and
//! no zone, so formatting and parsing a key never passes through UTC.

use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, NaiveDateTime};

/// Formats a day as its zero-padded `YYYY-MM-DD` lookup key.
pub fn date_to_key(day: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", day.year(), day.month(), day.day())
}

/// Strict `YYYY-MM-DD` parse. Anything else (extra whitespace, time
/// components, other separators) is rejected.
pub fn parse_key(key: &str) -> Option<NaiveDate> {
    let bytes = key.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    let year = key[0..4].parse().ok()?;
    let month = key[5..7].parse().ok()?;
    let day = key[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Lenient parse for date strings that failed the strict key format.
///
/// Timestamps carrying an offset are converted to the host's local calendar
/// day, so `2025-03-01T00:00:00Z` can land on Feb 28 west of UTC.
pub fn parse_loose(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some(day) = parse_key(s) {
        return Some(day);
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(s) {
        return Some(moment.with_timezone(&Local).date_naive());
    }
    if let Ok(moment) = DateTime::parse_from_rfc2822(s) {
        return Some(moment.with_timezone(&Local).date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y", "%Y.%m.%d"] {
        if let Ok(day) = NaiveDate::parse_from_str(s, fmt) {
            return Some(day);
        }
    }
    None
}

/// Whole days from `a` to `b` (negative when `b` is earlier).
pub fn diff_days(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// `None` when the result falls outside chrono's representable range.
pub fn add_days(day: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        day.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        day.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// Adds calendar months, clamping to the last day of shorter months
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(day: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        day.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        day.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(day)
}

pub fn is_weekend(day: NaiveDate) -> bool {
    day.weekday().num_days_from_monday() >= 5
}

/// Today's date on the host's local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
