//! Calendar utilities: deadline parsing, month differences, timezone-aware "today".

use chrono::{Datelike, Months, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{CoreError, Result};

/// Parse a deadline like "2026-12-31".
pub fn parse_deadline(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| CoreError::InvalidDate {
        input: input.to_string(),
    })
}

/// Whole calendar months from `from` to `to`.
///
/// A month only counts once the day-of-month is reached, so 2026-01-31 to
/// 2026-02-28 is 0 months. Negative when `to` is before `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    if to < from {
        return -months_between(to, from);
    }

    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months
}

/// Months left until `deadline`, never less than one.
pub fn months_left(today: NaiveDate, deadline: NaiveDate) -> u32 {
    months_between(today, deadline).max(1) as u32
}

/// Add `n` months to `date`, clamping the day to the end of the target month.
pub fn add_months_clamped(date: NaiveDate, n: u32) -> NaiveDate {
    date.checked_add_months(Months::new(n)).unwrap_or(NaiveDate::MAX)
}

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse()
        .map_err(|_| CoreError::InvalidTimezone(name.to_string()))
}

/// Current calendar date in `tz`.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}
