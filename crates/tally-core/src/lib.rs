//! Shared building blocks for the tally workspace: settings, identifiers and
//! core error types.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
