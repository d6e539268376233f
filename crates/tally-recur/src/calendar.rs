//! Calendar arithmetic shared by the tester and the expander.

use chrono::{Datelike, NaiveDate};

/// Day number (days since 0001-01-01, which is day 1) of `date`.
pub(crate) fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

/// Date with the given day number, if representable.
pub(crate) fn from_day_number(day: i64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(i32::try_from(day).ok()?)
}

/// Day number of the Monday starting `date`'s week.
///
/// Kept as a number because near `NaiveDate::MIN` that Monday is not a
/// representable date.
pub(crate) fn week_start(date: NaiveDate) -> i64 {
    day_number(date) - i64::from(date.weekday().num_days_from_monday())
}

/// Whole weeks between the weeks containing `from` and `to`.
pub(crate) fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (week_start(to) - week_start(from)) / 7
}

/// Calendar months from `from`'s month to `to`'s month, ignoring the day.
pub(crate) fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let years = i64::from(to.year()) - i64::from(from.year());
    years * 12 + i64::from(to.month0()) - i64::from(from.month0())
}

/// Last day of the given month, if the month is representable.
pub(crate) fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// `year-month-day`, with the day clipped to the month's last day.
pub(crate) fn clipped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = last_day_of_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last.day()))
}

/// `anchor` shifted by `months`, keeping its day-of-month where possible.
///
/// Always measured from the anchor, so Jan 31 steps to Feb 29 and then back
/// to Mar 31 rather than drifting to the 29th.
pub(crate) fn add_months(anchor: NaiveDate, months: i64) -> Option<NaiveDate> {
    let total = i64::from(anchor.year())
        .checked_mul(12)?
        .checked_add(i64::from(anchor.month0()))?
        .checked_add(months)?;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month0 = u32::try_from(total.rem_euclid(12)).ok()?;
    clipped_date(year, month0 + 1, anchor.day())
}

/// `anchor` shifted by `years`; Feb 29 clips to Feb 28 on common years.
pub(crate) fn add_years(anchor: NaiveDate, years: i64) -> Option<NaiveDate> {
    let year = i32::try_from(i64::from(anchor.year()).checked_add(years)?).ok()?;
    clipped_date(year, anchor.month(), anchor.day())
}

/// Smallest `k` with `k * step >= value`, for non-negative `value`.
pub(crate) fn ceil_div(value: i64, step: i64) -> i64 {
    (value + step - 1) / step
}
