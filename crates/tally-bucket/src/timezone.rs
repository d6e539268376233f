//! Timezone identifier resolution.
//!
//! Uses ICU4X to map Windows zone names and IANA aliases to canonical IANA
//! identifiers before handing them to `chrono-tz`.

use std::str::FromStr;

use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;

use crate::error::TimezoneError;

/// ## Summary
/// Resolves a user's timezone identifier to a `chrono_tz::Tz`.
///
/// Accepts IANA names (`Europe/Berlin`), IANA aliases (`Europe/Kiev`) and
/// Windows zone names (`Pacific Standard Time`).
///
/// ## Errors
/// Returns `TimezoneError::Unknown` if the identifier cannot be resolved.
/// There is no fallback to UTC.
pub fn resolve_timezone(id: &str) -> Result<Tz, TimezoneError> {
    let trimmed = id.trim();
    if let Ok(tz) = Tz::from_str(trimmed) {
        return Ok(tz);
    }

    let normalized = normalize_timezone_id(trimmed);
    let tz = Tz::from_str(&normalized).map_err(|_e| TimezoneError::Unknown(id.to_string()))?;

    tracing::trace!(id, resolved = %tz.name(), "Resolved timezone alias");
    Ok(tz)
}

/// Maps Windows zone names and IANA aliases to a canonical IANA name.
/// Unrecognised identifiers are returned unchanged.
fn normalize_timezone_id(id: &str) -> String {
    let iana_parser = IanaParserExtended::new();

    let windows_match = WindowsParser::new()
        .parse(id, None)
        .and_then(|zone| iana_parser.iter().find(|entry| entry.time_zone == zone));
    if let Some(entry) = windows_match {
        return entry.canonical.to_string();
    }

    let parsed = iana_parser.parse(id);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    id.to_string()
}
