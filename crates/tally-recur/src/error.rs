use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while parsing or expanding recurrence rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Invalid recurrence rule '{rule}': {reason}")]
    RuleFormat { rule: String, reason: String },

    #[error("Invalid range: end {end} is before start {start}")]
    Range { start: NaiveDate, end: NaiveDate },

    #[error("Expansion exceeded {max_iterations} iterations")]
    ExpansionLimit { max_iterations: u32 },
}

impl RecurrenceError {
    pub(crate) fn rule_format(rule: &str, reason: impl Into<String>) -> Self {
        Self::RuleFormat {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }
}

pub type RecurrenceResult<T> = std::result::Result<T, RecurrenceError>;
