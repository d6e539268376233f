//! Applying and reverting event contributions.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tally_core::types::{LabelId, UserId};

use crate::error::BucketResult;
use crate::key::BucketKey;
use crate::split::split_in_zone;
use crate::store::{BucketDelta, BucketStore};
use crate::timezone::resolve_timezone;

/// Whether a contribution is added to or removed from its buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Apply,
    Revert,
}

impl Direction {
    #[must_use]
    pub const fn sign(self) -> i64 {
        match self {
            Self::Apply => 1,
            Self::Revert => -1,
        }
    }
}

/// One completed event's share of tracked time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub label_id: LabelId,
    pub label_name: String,
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
}

/// Maintains day, week and month totals per label on top of a [`BucketStore`].
#[derive(Debug, Default)]
pub struct BucketAggregator<S> {
    store: S,
}

impl<S: BucketStore> BucketAggregator<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// ## Summary
    /// Adds (`Apply`) or subtracts (`Revert`) `minutes` starting at `start` to
    /// the label's buckets, split by the user's local days.
    ///
    /// Every local day touched contributes to its day, ISO week and month
    /// bucket. All deltas of the call are committed as one batch. Applying and
    /// then reverting the same arguments leaves every total unchanged.
    ///
    /// ## Errors
    /// Returns `BucketError::Timezone` for an unknown zone, `BucketError::Range`
    /// for unrepresentable instants, and any error of the store. Nothing is
    /// written on error.
    #[expect(clippy::too_many_arguments)]
    pub async fn adjust_buckets(
        &self,
        user_id: UserId,
        label_id: LabelId,
        label_name: &str,
        start: DateTime<Utc>,
        minutes: u32,
        timezone_id: &str,
        direction: Direction,
    ) -> BucketResult<BTreeSet<BucketKey>> {
        let tz = resolve_timezone(timezone_id)?;
        let contribution = Contribution {
            label_id,
            label_name: label_name.to_string(),
            start,
            duration_minutes: minutes,
        };
        let deltas = plan_deltas(user_id, &contribution, tz, direction)?;
        self.commit(&deltas).await
    }

    /// Writes a planned batch and returns the keys it touched.
    pub(crate) async fn commit(&self, deltas: &[BucketDelta]) -> BucketResult<BTreeSet<BucketKey>> {
        if deltas.is_empty() {
            return Ok(BTreeSet::new());
        }
        self.store.apply_deltas(deltas).await?;
        Ok(deltas.iter().map(|delta| delta.key).collect())
    }
}

/// ## Summary
/// Computes the merged per-key deltas for one contribution without writing.
///
/// ## Errors
/// Returns `BucketError::Range` for unrepresentable instants.
pub(crate) fn plan_deltas(
    user_id: UserId,
    contribution: &Contribution,
    tz: Tz,
    direction: Direction,
) -> BucketResult<Vec<BucketDelta>> {
    let segments = split_in_zone(contribution.start, contribution.duration_minutes, tz)?;

    let mut merged: BTreeMap<BucketKey, i64> = BTreeMap::new();
    for segment in &segments {
        let minutes = direction.sign() * i64::from(segment.minutes);
        for key in BucketKey::all_for_date(user_id, contribution.label_id, segment.local_date()) {
            *merged.entry(key).or_insert(0) += minutes;
        }
    }

    tracing::debug!(
        user = %user_id,
        label = %contribution.label_id,
        ?direction,
        segments = segments.len(),
        keys = merged.len(),
        "Planned bucket deltas"
    );

    Ok(merged
        .into_iter()
        .map(|(key, minutes)| BucketDelta {
            key,
            label_name: contribution.label_name.clone(),
            minutes,
        })
        .collect())
}
