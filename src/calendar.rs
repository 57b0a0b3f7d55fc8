//! UTC calendar conversions used to compute window boundaries.
//!
//! Time of day is always discarded: `from_calendar(to_calendar(t))` is the
//! midnight that starts `t`'s day, not `t` itself.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, NaiveDate};

/// A UTC calendar date as `(year, month, day)`, month and day 1-based.
pub type CalendarDate = (i32, u32, u32);

/// Converts a Unix timestamp to its UTC calendar date.
///
/// # Errors
///
/// Fails only for timestamps outside chrono's representable range.
pub fn to_calendar(timestamp: i64) -> Result<CalendarDate> {
    let date = DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| anyhow!("Timestamp {timestamp} is out of range"))?
        .date_naive();

    Ok((date.year(), date.month(), date.day()))
}

/// Returns the Unix timestamp for midnight UTC on the given date.
///
/// # Errors
///
/// Returns an error if `(year, month, day)` is not a valid Gregorian date.
pub fn from_calendar(year: i32, month: u32, day: u32) -> Result<i64> {
    let midnight = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow!("Invalid calendar date {year:04}-{month:02}-{day:02}"))?;

    Ok(midnight.and_utc().timestamp())
}
