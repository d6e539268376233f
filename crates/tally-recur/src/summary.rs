//! Human-readable recurrence descriptions.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::pattern::{Frequency, RecurrencePattern, Termination, monday_first};

/// ## Summary
/// Describes `pattern`, anchored at `start`, in plain English.
///
/// The text is deterministic and independent of the host locale, e.g.
/// `every 2 weeks on Mon/Wed from 2024-01-01 to 2024-06-01` or
/// `every day from 2024-01-01, ongoing`.
#[must_use]
pub fn build_summary(pattern: &RecurrencePattern, start: NaiveDate, end: Option<NaiveDate>) -> String {
    let mut text = cadence(pattern, start);

    text.push_str(" from ");
    text.push_str(&format_date(start));
    match (end, pattern.termination()) {
        (Some(end), _) => {
            text.push_str(" to ");
            text.push_str(&format_date(end));
        }
        (None, None) => text.push_str(", ongoing"),
        (None, Some(_)) => {}
    }

    match pattern.termination() {
        Some(Termination::Count(count)) if count.get() == 1 => text.push_str(", once"),
        Some(Termination::Count(count)) => text.push_str(&format!(", {count} times")),
        Some(Termination::Until(until)) => {
            text.push_str(", until ");
            text.push_str(&format_date(until));
        }
        None => {}
    }

    text
}

fn cadence(pattern: &RecurrencePattern, start: NaiveDate) -> String {
    let interval = pattern.interval().get();
    let every = |unit: &str| {
        if interval == 1 {
            format!("every {unit}")
        } else {
            format!("every {interval} {unit}s")
        }
    };

    match pattern.frequency() {
        Frequency::Unspecified => "unspecified recurrence".to_string(),
        Frequency::Daily => every("day"),
        Frequency::Weekly => {
            let days: Vec<_> = monday_first(pattern.effective_weekdays(start))
                .map(weekday_name)
                .collect();
            format!("{} on {}", every("week"), days.join("/"))
        }
        Frequency::Monthly => format!("{} on day {}", every("month"), start.day()),
        Frequency::Yearly => format!(
            "{} on {} {}",
            every("year"),
            month_name(start.month()),
            start.day()
        ),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

const fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}
