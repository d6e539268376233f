//! Change reconciliation against a recording store.

use tally_test::RecordingStore;
use tally_test::bucket::{BucketAggregator, BucketError, ChangeDescriptor, ChangeReconciler, Granularity};

use super::helpers::{USER, contribution, date, total, utc};

fn reconciler() -> ChangeReconciler<RecordingStore> {
    ChangeReconciler::new(BucketAggregator::new(RecordingStore::new()))
}

#[test_log::test(tokio::test)]
async fn relabel_after_completion_nets_to_zero() {
    let reconciler = reconciler();
    let store = reconciler.aggregator().store();
    let start = utc(2024, 3, 14, 10, 0);
    let day = date(2024, 3, 14);

    let complete = ChangeDescriptor {
        user_id: USER,
        timezone: "UTC".to_string(),
        was_completed: false,
        old: None,
        is_now_completed: true,
        new: Some(contribution(1, "Reading", start, 60)),
    };
    reconciler.reconcile(&complete).await.unwrap();

    let relabel = ChangeDescriptor {
        was_completed: true,
        old: Some(contribution(1, "Reading", start, 60)),
        new: Some(contribution(2, "Writing", start, 60)),
        ..complete
    };
    reconciler.reconcile(&relabel).await.unwrap();

    for granularity in Granularity::ALL {
        assert_eq!(total(store, 1, granularity, day).await, Some(0));
        assert_eq!(total(store, 2, granularity, day).await, Some(60));
    }

    let batches = store.batches().await;
    assert_eq!(batches.len(), 3);
    assert!(batches[1].iter().all(|delta| delta.minutes == -60));
    assert!(batches[2].iter().all(|delta| delta.label_name == "Writing"));
}

#[test_log::test(tokio::test)]
async fn precondition_violation_writes_nothing() {
    let reconciler = reconciler();
    let descriptor = ChangeDescriptor {
        user_id: USER,
        timezone: "Europe/Berlin".to_string(),
        was_completed: true,
        old: None,
        is_now_completed: true,
        new: Some(contribution(2, "Writing", utc(2024, 3, 14, 10, 0), 60)),
    };

    let err = reconciler.reconcile(&descriptor).await.unwrap_err();
    assert!(matches!(err, BucketError::PreconditionViolation(_)));
    assert!(reconciler.aggregator().store().batches().await.is_empty());
}
