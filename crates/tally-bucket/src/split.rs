//! Splitting a duration across local calendar days.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{BucketError, BucketResult};
use crate::timezone::resolve_timezone;

/// Longest stretch of missing local time searched when midnight falls into a
/// DST gap. Covers whole skipped days such as Pacific/Apia in 2011.
const MAX_GAP_MINUTES: i64 = 48 * 60;

/// Portion of a duration that falls on a single local calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSegment {
    pub local_start: DateTime<Tz>,
    pub minutes: u32,
}

impl TimeSegment {
    /// Local calendar date the segment is attributed to.
    #[must_use]
    pub fn local_date(&self) -> NaiveDate {
        self.local_start.date_naive()
    }
}

/// ## Summary
/// Splits `minutes` starting at `start` into one segment per local calendar
/// day of the zone named `timezone_id`.
///
/// ## Errors
/// Returns `BucketError::Timezone` for an unknown zone and
/// `BucketError::Range` if the span leaves the representable instant range.
pub fn split_by_local_day(
    start: DateTime<Utc>,
    minutes: u32,
    timezone_id: &str,
) -> BucketResult<Vec<TimeSegment>> {
    let tz = resolve_timezone(timezone_id)?;
    split_in_zone(start, minutes, tz)
}

/// ## Summary
/// Splits `minutes` starting at `start` across the local days of `tz`.
///
/// Segments are contiguous, ordered and never cross a local midnight. Their
/// minutes sum to exactly `minutes`: a sub-minute start offset is absorbed by
/// flooring the elapsed time at each boundary, and segments that would carry
/// zero minutes are dropped. Days shortened or lengthened by DST are measured
/// by elapsed time, not wall-clock time.
///
/// ## Errors
/// Returns `BucketError::Range` if the span leaves the representable instant
/// range.
pub fn split_in_zone(
    start: DateTime<Utc>,
    minutes: u32,
    tz: Tz,
) -> BucketResult<Vec<TimeSegment>> {
    let end = start
        .checked_add_signed(Duration::minutes(i64::from(minutes)))
        .ok_or_else(|| BucketError::Range(format!("{start} + {minutes} minutes")))?;

    let mut segments = Vec::new();
    let mut cursor = start;
    let mut emitted: i64 = 0;

    while cursor < end {
        let local = cursor.with_timezone(&tz);
        let boundary = next_local_midnight(tz, local.date_naive())?.min(end);

        let elapsed = (boundary - start).num_minutes();
        let segment_minutes = elapsed - emitted;
        if segment_minutes > 0 {
            let segment_minutes = u32::try_from(segment_minutes)
                .map_err(|_e| BucketError::Range(format!("{segment_minutes} minutes")))?;
            tracing::trace!(%local, minutes = segment_minutes, "Local day segment");
            segments.push(TimeSegment {
                local_start: local,
                minutes: segment_minutes,
            });
            emitted = elapsed;
        }
        cursor = boundary;
    }

    tracing::debug!(
        %start,
        minutes,
        timezone = %tz.name(),
        segments = segments.len(),
        "Split duration by local day"
    );
    Ok(segments)
}

/// First instant of the local day after `date`.
///
/// When midnight does not exist (DST gap) this is the first valid local
/// instant after it. When it exists twice, the earlier one.
fn next_local_midnight(tz: Tz, date: NaiveDate) -> BucketResult<DateTime<Utc>> {
    let next_day = date
        .succ_opt()
        .ok_or_else(|| BucketError::Range(format!("day after {date}")))?;
    let midnight = next_day.and_time(NaiveTime::MIN);

    (0..=MAX_GAP_MINUTES)
        .filter_map(|offset| midnight.checked_add_signed(Duration::minutes(offset)))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or_else(|| BucketError::Range(format!("no local midnight after {date} in {}", tz.name())))
}
