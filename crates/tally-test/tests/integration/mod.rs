//! Integration tests driving the public APIs the way the surrounding
//! application does: parse a rule, expand it into events, then feed the
//! completed events into the bucket aggregator.
//!
//! ```sh
//! cargo test -p tally-test --test scenarios
//! ```

mod helpers;
mod lifecycle;
mod recurrence;
mod reconcile;
