//! Storage seam for bucket totals.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{BucketError, BucketResult};
use crate::key::{BucketKey, LabelBucket};

/// Signed change to one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketDelta {
    pub key: BucketKey,
    pub label_name: String,
    pub minutes: i64,
}

/// Key-value accumulator holding bucket totals.
///
/// Implementations must apply a batch atomically: every delta of the batch is
/// added to its bucket, creating missing buckets at zero first, or none is.
/// Concurrent batches touching the same key must not lose updates.
pub trait BucketStore: Send + Sync {
    /// ## Summary
    /// Adds each delta to its bucket and records the delta's label name as the
    /// bucket's snapshot.
    ///
    /// ## Errors
    /// Returns `BucketError::Overflow` if a total would leave the `i64` range,
    /// or `BucketError::Store` if the backend fails. Nothing is written on error.
    fn apply_deltas(&self, deltas: &[BucketDelta]) -> impl Future<Output = BucketResult<()>> + Send;

    /// ## Summary
    /// Returns the bucket for `key`, if any contribution ever reached it.
    ///
    /// ## Errors
    /// Returns `BucketError::Store` if the backend fails.
    fn get(&self, key: &BucketKey) -> impl Future<Output = BucketResult<Option<LabelBucket>>> + Send;
}

impl<T: BucketStore> BucketStore for Arc<T> {
    fn apply_deltas(&self, deltas: &[BucketDelta]) -> impl Future<Output = BucketResult<()>> + Send {
        (**self).apply_deltas(deltas)
    }

    fn get(&self, key: &BucketKey) -> impl Future<Output = BucketResult<Option<LabelBucket>>> + Send {
        (**self).get(key)
    }
}

/// Process-local store. Batches are serialised behind one async mutex.
#[derive(Debug, Default)]
pub struct InMemoryBucketStore {
    buckets: Mutex<HashMap<BucketKey, LabelBucket>>,
}

impl InMemoryBucketStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every bucket, ordered by key.
    pub async fn snapshot(&self) -> Vec<LabelBucket> {
        let mut buckets: Vec<_> = self.buckets.lock().await.values().cloned().collect();
        buckets.sort_by_key(|bucket| bucket.key);
        buckets
    }
}

impl BucketStore for InMemoryBucketStore {
    async fn apply_deltas(&self, deltas: &[BucketDelta]) -> BucketResult<()> {
        let mut buckets = self.buckets.lock().await;

        // Validate the whole batch before touching the map.
        let mut totals: HashMap<BucketKey, i64> = HashMap::with_capacity(deltas.len());
        for delta in deltas {
            let current = match totals.get(&delta.key) {
                Some(total) => *total,
                None => buckets
                    .get(&delta.key)
                    .map_or(0, |bucket| bucket.duration_minutes),
            };
            let total = current
                .checked_add(delta.minutes)
                .ok_or(BucketError::Overflow { key: delta.key })?;
            totals.insert(delta.key, total);
        }

        for delta in deltas {
            let total = totals
                .get(&delta.key)
                .copied()
                .ok_or_else(|| BucketError::Store(format!("missing total for {}", delta.key)))?;
            let bucket = buckets.entry(delta.key).or_insert_with(|| LabelBucket {
                key: delta.key,
                label_name_snapshot: String::new(),
                duration_minutes: 0,
            });
            bucket.duration_minutes = total;
            bucket.label_name_snapshot.clone_from(&delta.label_name);

            if total < 0 {
                tracing::warn!(key = %delta.key, total, "Bucket total went negative");
            }
        }

        tracing::trace!(deltas = deltas.len(), "Applied bucket deltas");
        Ok(())
    }

    async fn get(&self, key: &BucketKey) -> BucketResult<Option<LabelBucket>> {
        Ok(self.buckets.lock().await.get(key).cloned())
    }
}
