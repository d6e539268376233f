//! Recurrence rules for tracked events.
//!
//! A rule is parsed once into an immutable [`RecurrencePattern`]. The pattern
//! is then anchored to the recurring event's reference date to test single
//! dates ([`occurs_on`]), expand a date range ([`expand`]) or describe itself
//! ([`build_summary`]).

mod calendar;
pub mod error;
pub mod expand;
pub mod occurrence;
pub mod parse;
pub mod pattern;
pub mod summary;

use std::collections::BTreeSet;

use chrono::NaiveDate;

pub use error::{RecurrenceError, RecurrenceResult};
pub use expand::{Expander, expand, expand_from};
pub use occurrence::occurs_on;
pub use parse::parse_rule;
pub use chrono::WeekdaySet;
pub use pattern::{Frequency, RecurrencePattern, Termination};
pub use summary::build_summary;

/// Dates on which a pattern would fire but must not.
pub type SkipDays = BTreeSet<NaiveDate>;
