use thiserror::Error;

use crate::key::BucketKey;

/// Error resolving a timezone identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimezoneError {
    #[error("Unknown timezone: {0}")]
    Unknown(String),
}

/// Errors raised while splitting durations or adjusting buckets.
#[derive(Error, Debug)]
pub enum BucketError {
    #[error(transparent)]
    Timezone(#[from] TimezoneError),

    #[error("Instant out of range: {0}")]
    Range(String),

    #[error("Precondition violation: {0}")]
    PreconditionViolation(&'static str),

    #[error("Bucket total overflow for {key}")]
    Overflow { key: BucketKey },

    #[error("Bucket store error: {0}")]
    Store(String),
}

pub type BucketResult<T> = std::result::Result<T, BucketError>;
