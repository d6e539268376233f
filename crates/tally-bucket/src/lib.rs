//! Time-bucket aggregation for tracked events.
//!
//! An event's duration is split across the owner's local calendar days
//! ([`split_by_local_day`]) and added to per-label running totals at day, ISO
//! week and month granularity ([`BucketAggregator`]). Edits to completed events
//! are expressed as a revert of the old contribution plus an apply of the new
//! one ([`ChangeReconciler`]).

pub mod aggregate;
pub mod error;
pub mod key;
pub mod reconcile;
pub mod split;
pub mod store;
pub mod timezone;

pub use aggregate::{BucketAggregator, Contribution, Direction};
pub use error::{BucketError, BucketResult, TimezoneError};
pub use key::{BucketKey, Granularity, LabelBucket};
pub use reconcile::{ChangeDescriptor, ChangeReconciler};
pub use split::{TimeSegment, split_by_local_day, split_in_zone};
pub use store::{BucketDelta, BucketStore, InMemoryBucketStore};
pub use timezone::resolve_timezone;
