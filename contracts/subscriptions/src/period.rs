//! Due date arithmetic.
//!
//! Month steps follow the proleptic Gregorian calendar: the time of day and
//! day of month are kept, and a day that does not exist in the target month
//! rolls over into the next one (Jan 31 + 1 month = Mar 3 in a common year).

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime};

use crate::error::Error;
use crate::types::TimeUnit;

pub const SECONDS_PER_HOUR: u64 = 60 * 60;
pub const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Returns the timestamp `count` units of `unit` after `current`.
pub fn next_due_date(current: u64, unit: TimeUnit, count: u32) -> Result<u64, Error> {
    match unit {
        TimeUnit::Hour => add_seconds(current, count, SECONDS_PER_HOUR),
        TimeUnit::Day => add_seconds(current, count, SECONDS_PER_DAY),
        TimeUnit::Month => add_months(current, count),
    }
}

fn add_seconds(current: u64, count: u32, unit_seconds: u64) -> Result<u64, Error> {
    u64::from(count)
        .checked_mul(unit_seconds)
        .and_then(|delta| current.checked_add(delta))
        .ok_or(Error::ArithmeticOverflow)
}

fn add_months(current: u64, count: u32) -> Result<u64, Error> {
    let timestamp = i64::try_from(current).map_err(|_| Error::ArithmeticOverflow)?;
    let datetime =
        OffsetDateTime::from_unix_timestamp(timestamp).map_err(|_| Error::ArithmeticOverflow)?;

    // months since year 0, zero-based month
    let months = i64::from(datetime.year()) * 12
        + i64::from(u8::from(datetime.month()) - 1)
        + i64::from(count);

    let year = i32::try_from(months.div_euclid(12)).map_err(|_| Error::ArithmeticOverflow)?;
    let month = Month::try_from((months.rem_euclid(12) + 1) as u8)
        .map_err(|_| Error::ArithmeticOverflow)?;

    let first_of_month =
        Date::from_calendar_date(year, month, 1).map_err(|_| Error::ArithmeticOverflow)?;
    let date = first_of_month
        .checked_add(Duration::days(i64::from(datetime.day()) - 1))
        .ok_or(Error::ArithmeticOverflow)?;

    let next = PrimitiveDateTime::new(date, datetime.time())
        .assume_utc()
        .unix_timestamp();

    u64::try_from(next).map_err(|_| Error::ArithmeticOverflow)
}
