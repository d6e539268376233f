//! Rule text parser.
//!
//! Accepted forms, tried in order:
//! 1. `UNSPECIFIED`
//! 2. `<FREQ>` (interval 1)
//! 3. `<FREQ>,<N>` (interval `N`)
//! 4. `FREQ=<FREQ>[;INTERVAL=<N>][;BYDAY=MO,WE,..][;COUNT=<N>|;UNTIL=<DATE>]`,
//!    optionally prefixed with `RRULE:`
//!
//! Tokens are case-insensitive and surrounding whitespace is ignored.

use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{NaiveDate, WeekdaySet};

use crate::error::{RecurrenceError, RecurrenceResult};
use crate::pattern::{Frequency, RecurrencePattern, Termination, parse_weekday_code};

/// ## Summary
/// Parses rule text into a [`RecurrencePattern`].
///
/// ## Errors
/// Returns `RecurrenceError::RuleFormat` if the text matches none of the
/// accepted forms, names an unknown frequency or weekday, or carries a
/// non-positive or non-numeric interval or count.
pub fn parse_rule(text: &str) -> RecurrenceResult<RecurrencePattern> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RecurrenceError::rule_format(text, "rule is empty"));
    }

    let pattern = if trimmed.eq_ignore_ascii_case(Frequency::Unspecified.as_str()) {
        RecurrencePattern::new(
            Frequency::Unspecified,
            NonZeroU32::MIN,
            WeekdaySet::EMPTY,
            None,
            text,
        )
    } else if trimmed.contains('=') {
        parse_structured(text, trimmed)?
    } else if let Some((freq, interval)) = trimmed.split_once(',') {
        let frequency = parse_frequency(text, freq.trim())?;
        let interval = parse_positive(text, "interval", interval.trim())?;
        RecurrencePattern::new(frequency, interval, WeekdaySet::EMPTY, None, text)
    } else {
        let frequency = parse_frequency(text, trimmed)?;
        RecurrencePattern::new(frequency, NonZeroU32::MIN, WeekdaySet::EMPTY, None, text)
    };

    tracing::trace!(rule = %text, pattern = %pattern, "Parsed recurrence rule");
    Ok(pattern)
}

impl FromStr for RecurrencePattern {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rule(s)
    }
}

/// Parts collected from a structured rule before validation.
#[derive(Default)]
struct RuleParts {
    frequency: Option<Frequency>,
    interval: Option<NonZeroU32>,
    weekdays: Option<WeekdaySet>,
    count: Option<NonZeroU32>,
    until: Option<NaiveDate>,
}

fn parse_structured(raw: &str, trimmed: &str) -> RecurrenceResult<RecurrencePattern> {
    let body = strip_prefix_ignore_case(trimmed, "RRULE:").unwrap_or(trimmed);
    let mut parts = RuleParts::default();

    for part in body.split(';').map(str::trim).filter(|part| !part.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| RecurrenceError::rule_format(raw, format!("'{part}' is not KEY=VALUE")))?;
        parse_rule_part(raw, &mut parts, key.trim(), value.trim())?;
    }

    let frequency = parts
        .frequency
        .ok_or_else(|| RecurrenceError::rule_format(raw, "FREQ is required"))?;

    let weekdays = parts.weekdays.unwrap_or_default();
    if !weekdays.is_empty() && frequency != Frequency::Weekly {
        return Err(RecurrenceError::rule_format(
            raw,
            "BYDAY is only supported with FREQ=WEEKLY",
        ));
    }

    let termination = match (parts.count, parts.until) {
        (Some(_), Some(_)) => {
            return Err(RecurrenceError::rule_format(
                raw,
                "COUNT and UNTIL are mutually exclusive",
            ));
        }
        (Some(count), None) => Some(Termination::Count(count)),
        (None, Some(until)) => Some(Termination::Until(until)),
        (None, None) => None,
    };

    Ok(RecurrencePattern::new(
        frequency,
        parts.interval.unwrap_or(NonZeroU32::MIN),
        weekdays,
        termination,
        raw,
    ))
}

/// Parses a single `KEY=VALUE` pair of a structured rule.
fn parse_rule_part(
    raw: &str,
    parts: &mut RuleParts,
    key: &str,
    value: &str,
) -> RecurrenceResult<()> {
    let upper = key.to_ascii_uppercase();
    let duplicate = || RecurrenceError::rule_format(raw, format!("{upper} is given twice"));

    match upper.as_str() {
        "FREQ" => {
            if parts.frequency.is_some() {
                return Err(duplicate());
            }
            parts.frequency = Some(parse_frequency(raw, value)?);
        }
        "INTERVAL" => {
            if parts.interval.is_some() {
                return Err(duplicate());
            }
            parts.interval = Some(parse_positive(raw, "INTERVAL", value)?);
        }
        "BYDAY" => {
            if parts.weekdays.is_some() {
                return Err(duplicate());
            }
            parts.weekdays = Some(parse_byday(raw, value)?);
        }
        "COUNT" => {
            if parts.count.is_some() {
                return Err(duplicate());
            }
            parts.count = Some(parse_positive(raw, "COUNT", value)?);
        }
        "UNTIL" => {
            if parts.until.is_some() {
                return Err(duplicate());
            }
            parts.until = Some(parse_until(raw, value)?);
        }
        _ => {
            return Err(RecurrenceError::rule_format(
                raw,
                format!("unsupported rule part '{key}'"),
            ));
        }
    }
    Ok(())
}

fn parse_frequency(raw: &str, value: &str) -> RecurrenceResult<Frequency> {
    Frequency::parse(value)
        .ok_or_else(|| RecurrenceError::rule_format(raw, format!("unknown frequency '{value}'")))
}

fn parse_positive(raw: &str, what: &str, value: &str) -> RecurrenceResult<NonZeroU32> {
    value
        .parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| {
            RecurrenceError::rule_format(
                raw,
                format!("{what} must be a positive integer, got '{value}'"),
            )
        })
}

/// Parses a BYDAY list of plain weekdays (`MO,WE,FR`). Ordinals are rejected.
fn parse_byday(raw: &str, value: &str) -> RecurrenceResult<WeekdaySet> {
    let mut set = WeekdaySet::EMPTY;
    for code in value.split(',').map(str::trim) {
        let weekday = parse_weekday_code(code)
            .ok_or_else(|| RecurrenceError::rule_format(raw, format!("invalid weekday '{code}'")))?;
        set.insert(weekday);
    }
    Ok(set)
}

/// UNTIL accepts `YYYYMMDD`, `YYYY-MM-DD` or a `YYYYMMDDTHHMMSS[Z]` date-time,
/// of which only the date is kept.
fn parse_until(raw: &str, value: &str) -> RecurrenceResult<NaiveDate> {
    let date_part = value.split_once(['T', 't']).map_or(value, |(date, _)| date);
    NaiveDate::parse_from_str(date_part, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y-%m-%d"))
        .map_err(|err| RecurrenceError::rule_format(raw, format!("invalid UNTIL '{value}': {err}")))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}
