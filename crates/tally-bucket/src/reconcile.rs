//! Reconciling bucket totals after an event changes.

use std::collections::BTreeSet;

use tally_core::types::UserId;

use crate::aggregate::{BucketAggregator, Contribution, Direction, plan_deltas};
use crate::error::{BucketError, BucketResult};
use crate::key::BucketKey;
use crate::store::BucketStore;
use crate::timezone::resolve_timezone;

/// Before and after state of one tracked event.
///
/// `old` must be present when `was_completed` is set and `new` when
/// `is_now_completed` is set. Contributions of incomplete events are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDescriptor {
    pub user_id: UserId,
    pub timezone: String,
    pub was_completed: bool,
    pub old: Option<Contribution>,
    pub is_now_completed: bool,
    pub new: Option<Contribution>,
}

/// Moves an event's contribution between buckets when it is edited,
/// completed or un-completed.
#[derive(Debug, Default)]
pub struct ChangeReconciler<S> {
    aggregator: BucketAggregator<S>,
}

impl<S: BucketStore> ChangeReconciler<S> {
    #[must_use]
    pub const fn new(aggregator: BucketAggregator<S>) -> Self {
        Self { aggregator }
    }

    #[must_use]
    pub const fn aggregator(&self) -> &BucketAggregator<S> {
        &self.aggregator
    }

    /// ## Summary
    /// Reverts the old contribution if the event was completed, then applies
    /// the new one if it is completed now. Returns every key either step
    /// touched.
    ///
    /// The revert and the apply are two separate store batches. Both are
    /// planned, and the timezone resolved, before either is written.
    ///
    /// ## Errors
    /// Returns `BucketError::PreconditionViolation` if a completion flag is set
    /// without its contribution, before anything is written. Other errors are
    /// those of [`BucketAggregator::adjust_buckets`].
    pub async fn reconcile(&self, change: &ChangeDescriptor) -> BucketResult<BTreeSet<BucketKey>> {
        let old = match (change.was_completed, &change.old) {
            (true, None) => {
                return Err(BucketError::PreconditionViolation(
                    "was_completed is set but the old contribution is missing",
                ));
            }
            (true, Some(old)) => Some(old),
            (false, _) => None,
        };
        let new = match (change.is_now_completed, &change.new) {
            (true, None) => {
                return Err(BucketError::PreconditionViolation(
                    "is_now_completed is set but the new contribution is missing",
                ));
            }
            (true, Some(new)) => Some(new),
            (false, _) => None,
        };

        if old.is_none() && new.is_none() {
            return Ok(BTreeSet::new());
        }

        let tz = resolve_timezone(&change.timezone)?;
        let revert = old
            .map(|old| plan_deltas(change.user_id, old, tz, Direction::Revert))
            .transpose()?
            .unwrap_or_default();
        let apply = new
            .map(|new| plan_deltas(change.user_id, new, tz, Direction::Apply))
            .transpose()?
            .unwrap_or_default();

        let mut touched = self.aggregator.commit(&revert).await?;
        touched.extend(self.aggregator.commit(&apply).await?);

        tracing::debug!(
            user = %change.user_id,
            reverted = revert.len(),
            applied = apply.len(),
            touched = touched.len(),
            "Reconciled event change"
        );
        Ok(touched)
    }
}
