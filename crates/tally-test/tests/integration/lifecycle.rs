//! Recurring event lifecycle: expand a rule into events, complete them, then
//! undo the completions.

use chrono::{NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use tally_test::RecordingStore;
use tally_test::bucket::{BucketAggregator, Direction, Granularity, split_by_local_day};
use tally_test::common::types::LabelId;
use tally_test::recur::{SkipDays, expand, parse_rule};

use super::helpers::{USER, date, total, utc};

const TIMEZONE: &str = "America/New_York";

#[test_log::test]
fn late_evening_event_spills_into_next_day() {
    let segments = split_by_local_day(utc(2024, 7, 1, 23, 30), 90, "UTC").unwrap();
    let parts: Vec<_> = segments
        .iter()
        .map(|segment| (segment.local_date(), segment.local_start.time(), segment.minutes))
        .collect();
    assert_eq!(
        parts,
        vec![
            (date(2024, 7, 1), NaiveTime::from_hms_opt(23, 30, 0).unwrap(), 30),
            (date(2024, 7, 2), NaiveTime::MIN, 60),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn completing_and_undoing_a_recurring_series() {
    let pattern = parse_rule("FREQ=WEEKLY;BYDAY=MO,WE").unwrap();
    let skip: SkipDays = [date(2024, 1, 10)].into_iter().collect();
    let days = expand(&pattern, date(2024, 1, 1), date(2024, 1, 31), &skip).unwrap();
    assert_eq!(days.len(), 9);

    let tz: Tz = Tz::America__New_York;
    let starts: Vec<_> = days
        .iter()
        .map(|day| {
            tz.from_local_datetime(&day.and_hms_opt(23, 30, 0).unwrap())
                .single()
                .unwrap()
                .with_timezone(&Utc)
        })
        .collect();

    let aggregator = BucketAggregator::new(RecordingStore::new());
    let aggregator = &aggregator;
    let store = aggregator.store();
    let adjust_all = |direction: Direction| {
        join_all(starts.iter().map(move |start| {
            aggregator.adjust_buckets(USER, LabelId(9), "Practice", *start, 90, TIMEZONE, direction)
        }))
    };

    for result in adjust_all(Direction::Apply).await {
        result.unwrap();
    }

    assert_eq!(total(store, 9, Granularity::Day, date(2024, 1, 1)).await, Some(30));
    assert_eq!(total(store, 9, Granularity::Day, date(2024, 1, 2)).await, Some(60));
    assert_eq!(total(store, 9, Granularity::Day, date(2024, 1, 10)).await, None);
    assert_eq!(total(store, 9, Granularity::Day, date(2024, 1, 11)).await, None);
    assert_eq!(total(store, 9, Granularity::Week, date(2024, 1, 1)).await, Some(180));
    assert_eq!(total(store, 9, Granularity::Week, date(2024, 1, 8)).await, Some(90));
    assert_eq!(total(store, 9, Granularity::Week, date(2024, 1, 29)).await, Some(180));
    assert_eq!(total(store, 9, Granularity::Month, date(2024, 1, 1)).await, Some(9 * 90 - 60));
    assert_eq!(total(store, 9, Granularity::Month, date(2024, 2, 1)).await, Some(60));
    assert_eq!(store.batches().await.len(), 9);

    for result in adjust_all(Direction::Revert).await {
        result.unwrap();
    }

    let buckets = store.buckets().await;
    assert!(!buckets.is_empty());
    assert!(buckets.iter().all(|bucket| bucket.duration_minutes == 0));
    assert!(buckets.iter().all(|bucket| bucket.label_name_snapshot == "Practice"));
}
