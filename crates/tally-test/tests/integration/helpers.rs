#![allow(dead_code)]
//! Shared constructors for integration tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tally_test::bucket::{BucketKey, BucketStore, Contribution, Granularity};
use tally_test::common::types::{LabelId, UserId};

pub const USER: UserId = UserId(42);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn contribution(label: i64, name: &str, start: DateTime<Utc>, minutes: u32) -> Contribution {
    Contribution {
        label_id: LabelId(label),
        label_name: name.to_string(),
        start,
        duration_minutes: minutes,
    }
}

/// Total of the bucket containing `day`, or `None` if it was never written.
pub async fn total<S: BucketStore>(
    store: &S,
    label: i64,
    granularity: Granularity,
    day: NaiveDate,
) -> Option<i64> {
    let key = BucketKey::for_date(USER, LabelId(label), granularity, day);
    store
        .get(&key)
        .await
        .unwrap()
        .map(|bucket| bucket.duration_minutes)
}
