//! Single-date occurrence test.
//!
//! Everything here is closed-form: no intermediate dates are generated, so the
//! cost does not depend on how far `date` lies from the anchor.

use chrono::{Datelike, NaiveDate};

use crate::calendar::{add_months, add_years, months_between, weeks_between};
use crate::pattern::{Frequency, RecurrencePattern, Termination, count_before};

/// ## Summary
/// Returns whether `pattern`, anchored at `anchor`, fires on `date`.
///
/// Skip days are not consulted; callers that need skip-aware answers must
/// check their skip set as well. Dates before the anchor never occur.
#[must_use]
pub fn occurs_on(pattern: &RecurrencePattern, anchor: NaiveDate, date: NaiveDate) -> bool {
    occurrence_index(pattern, anchor, date)
        .is_some_and(|index| within_termination(pattern, date, index))
}

/// Zero-based position of `date` among the pattern's occurrences counted from
/// `anchor`, ignoring termination. `None` if the pattern does not fire there.
pub(crate) fn occurrence_index(
    pattern: &RecurrencePattern,
    anchor: NaiveDate,
    date: NaiveDate,
) -> Option<u64> {
    if date < anchor {
        return None;
    }
    let interval = i64::from(pattern.interval().get());

    let index = match pattern.frequency() {
        Frequency::Unspecified => return None,
        Frequency::Daily => {
            let offset = (date - anchor).num_days();
            (offset % interval == 0).then_some(offset / interval)?
        }
        Frequency::Weekly => return weekly_index(pattern, anchor, date),
        Frequency::Monthly => {
            let offset = months_between(anchor, date);
            let aligned = offset % interval == 0 && add_months(anchor, offset) == Some(date);
            aligned.then_some(offset / interval)?
        }
        Frequency::Yearly => {
            let offset = i64::from(date.year()) - i64::from(anchor.year());
            let aligned = offset % interval == 0 && add_years(anchor, offset) == Some(date);
            aligned.then_some(offset / interval)?
        }
    };

    u64::try_from(index).ok()
}

/// Weekly position: the anchor's week contributes only the listed weekdays on
/// or after the anchor, every later aligned week contributes all of them.
fn weekly_index(pattern: &RecurrencePattern, anchor: NaiveDate, date: NaiveDate) -> Option<u64> {
    let days = pattern.effective_weekdays(anchor);
    if !days.contains(date.weekday()) {
        return None;
    }

    let interval = i64::from(pattern.interval().get());
    let weeks = weeks_between(anchor, date);
    if weeks % interval != 0 {
        return None;
    }
    let period = u64::try_from(weeks / interval).ok()?;

    let skipped_in_first_week = u64::from(count_before(days, anchor.weekday()));
    let before_in_week = u64::from(count_before(days, date.weekday()));

    if period == 0 {
        return before_in_week.checked_sub(skipped_in_first_week);
    }

    let per_week = u64::from(days.len());
    let first_week = per_week - skipped_in_first_week;
    Some(first_week + (period - 1) * per_week + before_in_week)
}

pub(crate) fn within_termination(pattern: &RecurrencePattern, date: NaiveDate, index: u64) -> bool {
    match pattern.termination() {
        None => true,
        Some(Termination::Until(until)) => date <= until,
        Some(Termination::Count(count)) => index < u64::from(count.get()),
    }
}
