//! Calendar arithmetic used by the occurrence search.

use chrono::{Datelike, NaiveDate, Weekday};

pub(crate) fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Adds whole months, clamping the day to the end of the target month
/// (Jan 31 + 1 month = Feb 28/29, Feb 29 + 12 months = Feb 28).
pub(crate) fn add_months_clamped(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

pub(crate) fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.num_days_from_ce()) - i64::from(from.num_days_from_ce())
}

/// Number of week boundaries (weeks starting on `week_start`) between two dates.
pub(crate) fn weeks_between(from: NaiveDate, to: NaiveDate, week_start: Weekday) -> i64 {
    let start_of_week = |d: NaiveDate| {
        let offset = (7 + d.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
        i64::from(d.num_days_from_ce()) - i64::from(offset)
    };
    (start_of_week(to) - start_of_week(from)).div_euclid(7)
}

pub(crate) fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (i64::from(to.year()) - i64::from(from.year())) * 12 + i64::from(to.month()) - i64::from(from.month())
}

pub(crate) fn years_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year()) - i64::from(from.year())
}

/// Whether `day` is the day-of-month `target`; negative targets count from the month end.
pub(crate) fn is_month_day(day: NaiveDate, target: i8) -> bool {
    let dim = days_in_month(day.year(), day.month()) as i32;
    let target = i32::from(target);
    let wanted = if target > 0 { target } else { dim + target + 1 };
    wanted == day.day() as i32
}

/// Whether `day` is the `ordinal`-th occurrence of its weekday within its month.
pub(crate) fn is_nth_weekday_of_month(day: NaiveDate, ordinal: i8) -> bool {
    let dim = days_in_month(day.year(), day.month());
    let from_start = (day.day0() / 7) as i32 + 1;
    let from_end = -(((dim - day.day()) / 7) as i32 + 1);
    let ordinal = i32::from(ordinal);
    ordinal == from_start || ordinal == from_end
}

/// Whether `day` is the `ordinal`-th occurrence of its weekday within its year.
pub(crate) fn is_nth_weekday_of_year(day: NaiveDate, ordinal: i8) -> bool {
    let diy = days_in_year(day.year());
    let from_start = (day.ordinal0() / 7) as i32 + 1;
    let from_end = -(((diy - day.ordinal()) / 7) as i32 + 1);
    let ordinal = i32::from(ordinal);
    ordinal == from_start || ordinal == from_end
}
