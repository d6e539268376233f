//! Command-line driver for the recurrence and bucketing engines.

pub mod command;
