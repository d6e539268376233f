//! Bucket keys and accumulated totals.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tally_core::types::{LabelId, UserId};

/// Aggregation period of a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub const ALL: [Self; 3] = [Self::Day, Self::Week, Self::Month];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Natural key of a label bucket.
///
/// - `Day`: `period_value` is `YYYYMMDD`, `period_year` the calendar year.
/// - `Week`: `period_value` is the ISO week number, `period_year` the ISO
///   week-based year (2024-12-30 belongs to week 1 of 2025).
/// - `Month`: `period_value` is the month 1-12, `period_year` the calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BucketKey {
    pub user_id: UserId,
    pub label_id: LabelId,
    pub granularity: Granularity,
    pub period_year: i32,
    pub period_value: u32,
}

impl BucketKey {
    /// ## Summary
    /// Key of the `granularity` bucket containing the local calendar `date`.
    #[must_use]
    pub fn for_date(
        user_id: UserId,
        label_id: LabelId,
        granularity: Granularity,
        date: NaiveDate,
    ) -> Self {
        let (period_year, period_value) = match granularity {
            Granularity::Day => (date.year(), day_value(date)),
            Granularity::Week => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
            Granularity::Month => (date.year(), date.month()),
        };

        Self {
            user_id,
            label_id,
            granularity,
            period_year,
            period_value,
        }
    }

    /// Day, week and month keys for one local date.
    #[must_use]
    pub fn all_for_date(user_id: UserId, label_id: LabelId, date: NaiveDate) -> [Self; 3] {
        Granularity::ALL.map(|granularity| Self::for_date(user_id, label_id, granularity, date))
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user {} label {} {} {}/{}",
            self.user_id, self.label_id, self.granularity, self.period_year, self.period_value
        )
    }
}

/// `YYYYMMDD` as a number. Years outside 0..=9999 are not expected here.
fn day_value(date: NaiveDate) -> u32 {
    let year = u32::try_from(date.year()).unwrap_or_default();
    year * 10_000 + date.month() * 100 + date.day()
}

/// Running total for one bucket key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelBucket {
    pub key: BucketKey,
    /// Label name as of the most recent contribution.
    pub label_name_snapshot: String,
    /// Signed sum of all contributions. Not floored at zero.
    pub duration_minutes: i64,
}
