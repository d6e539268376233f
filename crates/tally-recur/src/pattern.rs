//! Parsed recurrence pattern and its building blocks.

use std::fmt;
use std::num::NonZeroU32;

use chrono::{NaiveDate, Weekday, WeekdaySet};
use serde::{Deserialize, Serialize};

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Placeholder for draft recurring events. Never produces occurrences.
    Unspecified,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
            Self::Unspecified => "UNSPECIFIED",
        }
    }

    /// Parses a concrete frequency (case-insensitive).
    ///
    /// `UNSPECIFIED` is not accepted here; it is only valid as a whole rule.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            _ => return None,
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Members of `days` strictly before `weekday` in Monday-first order.
pub(crate) fn count_before(days: WeekdaySet, weekday: Weekday) -> u32 {
    let members = days
        .iter(Weekday::Mon)
        .take_while(|day| day.num_days_from_monday() < weekday.num_days_from_monday())
        .count();
    u32::try_from(members).unwrap_or(u32::MAX)
}

/// Weekdays in rule order, Monday first.
pub(crate) fn monday_first(days: WeekdaySet) -> impl Iterator<Item = Weekday> {
    days.iter(Weekday::Mon)
}

/// Two-letter rule abbreviation (`MO`, `TU`, ...).
pub(crate) const fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Parses a two-letter weekday abbreviation (case-insensitive).
pub(crate) fn parse_weekday_code(s: &str) -> Option<Weekday> {
    monday_first(WeekdaySet::ALL)
        .find(|weekday| weekday_code(*weekday).eq_ignore_ascii_case(s))
}

/// How a recurrence stops, if it stops at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// Fires on the first `n` occurrences counted from the anchor.
    Count(NonZeroU32),
    /// Last permissible date (inclusive).
    Until(NaiveDate),
}

/// Parsed recurrence rule.
///
/// Immutable once parsed. The anchor date it is measured from belongs to the
/// recurring event, not to the pattern, so one pattern can be shared by events
/// that start on different dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrencePattern {
    frequency: Frequency,
    interval: NonZeroU32,
    weekdays: WeekdaySet,
    termination: Option<Termination>,
    raw_rule: String,
}

impl RecurrencePattern {
    pub(crate) fn new(
        frequency: Frequency,
        interval: NonZeroU32,
        weekdays: WeekdaySet,
        termination: Option<Termination>,
        raw_rule: impl Into<String>,
    ) -> Self {
        Self {
            frequency,
            interval,
            weekdays,
            termination,
            raw_rule: raw_rule.into(),
        }
    }

    /// Draft pattern that never fires.
    #[must_use]
    pub fn unspecified() -> Self {
        Self::new(
            Frequency::Unspecified,
            NonZeroU32::MIN,
            WeekdaySet::EMPTY,
            None,
            Frequency::Unspecified.as_str(),
        )
    }

    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    #[must_use]
    pub const fn interval(&self) -> NonZeroU32 {
        self.interval
    }

    /// Explicit weekdays. Empty unless the rule listed `BYDAY`.
    #[must_use]
    pub const fn weekdays(&self) -> WeekdaySet {
        self.weekdays
    }

    #[must_use]
    pub const fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// The rule text exactly as it was parsed.
    #[must_use]
    pub fn raw_rule(&self) -> &str {
        &self.raw_rule
    }

    #[must_use]
    pub const fn is_unspecified(&self) -> bool {
        matches!(self.frequency, Frequency::Unspecified)
    }

    /// Weekdays a weekly pattern fires on when anchored at `anchor`.
    ///
    /// Falls back to the anchor's weekday when no `BYDAY` was given.
    #[must_use]
    pub fn effective_weekdays(&self, anchor: NaiveDate) -> WeekdaySet {
        use chrono::Datelike;

        if self.weekdays.is_empty() {
            WeekdaySet::single(anchor.weekday())
        } else {
            self.weekdays
        }
    }
}

/// Canonical structured form, e.g. `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE`.
impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unspecified() {
            return write!(f, "{}", self.frequency);
        }

        let mut parts = vec![format!("FREQ={}", self.frequency)];

        if self.interval.get() != 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }

        if !self.weekdays.is_empty() {
            let days: Vec<_> = monday_first(self.weekdays).map(weekday_code).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }

        match self.termination {
            Some(Termination::Count(count)) => parts.push(format!("COUNT={count}")),
            Some(Termination::Until(until)) => {
                parts.push(format!("UNTIL={}", until.format("%Y%m%d")));
            }
            None => {}
        }

        write!(f, "{}", parts.join(";"))
    }
}
