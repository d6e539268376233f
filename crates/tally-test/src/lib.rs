//! Tally - integration test support.
//!
//! Re-exports the workspace crates under one root and provides a store that
//! records every batch it receives, for tests that assert on write behaviour.

use std::sync::Arc;

use tokio::sync::Mutex;

pub use tally_bucket as bucket;
pub use tally_core as common;
pub use tally_recur as recur;

use tally_bucket::{BucketDelta, BucketKey, BucketResult, BucketStore, InMemoryBucketStore, LabelBucket};

/// [`InMemoryBucketStore`] that also keeps a log of applied batches.
#[derive(Debug, Default, Clone)]
pub struct RecordingStore {
    inner: Arc<InMemoryBucketStore>,
    batches: Arc<Mutex<Vec<Vec<BucketDelta>>>>,
}

impl RecordingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches applied so far, oldest first.
    pub async fn batches(&self) -> Vec<Vec<BucketDelta>> {
        self.batches.lock().await.clone()
    }

    /// Every stored bucket, ordered by key.
    pub async fn buckets(&self) -> Vec<LabelBucket> {
        self.inner.snapshot().await
    }
}

impl BucketStore for RecordingStore {
    async fn apply_deltas(&self, deltas: &[BucketDelta]) -> BucketResult<()> {
        self.inner.apply_deltas(deltas).await?;
        self.batches.lock().await.push(deltas.to_vec());
        tracing::trace!(deltas = deltas.len(), "Recorded batch");
        Ok(())
    }

    async fn get(&self, key: &BucketKey) -> BucketResult<Option<LabelBucket>> {
        self.inner.get(key).await
    }
}
