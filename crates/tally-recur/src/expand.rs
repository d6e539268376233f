//! Range expansion.
//!
//! Expansion jumps straight to the first phase-aligned candidate on or after
//! the range start and then steps by the frequency's unit times the interval.
//! The stepping strategy is chosen once per call. Skip days are removed in a
//! final pass so they never shift the cadence.

use chrono::{Datelike, Days, NaiveDate};
use tally_core::config::RecurrenceConfig;
use tally_core::constants::DEFAULT_MAX_ITERATIONS;

use crate::SkipDays;
use crate::calendar::{
    add_months, add_years, ceil_div, day_number, from_day_number, months_between, week_start,
    weeks_between,
};
use crate::error::{RecurrenceError, RecurrenceResult};
use crate::occurrence::{occurrence_index, within_termination};
use crate::pattern::{Frequency, RecurrencePattern, Termination, monday_first};

/// ## Summary
/// Expands recurrence patterns into concrete dates with a bounded amount of
/// work per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expander {
    max_iterations: u32,
}

impl Default for Expander {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl Expander {
    /// Creates an expander that fails after `max_iterations` stepping iterations.
    #[must_use]
    pub const fn new(max_iterations: u32) -> Self {
        Self { max_iterations }
    }

    #[must_use]
    pub const fn from_config(config: &RecurrenceConfig) -> Self {
        Self::new(config.max_iterations)
    }

    #[must_use]
    pub const fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// ## Summary
    /// Expands `pattern` over `[start, end]`, anchored at `start`.
    ///
    /// ## Errors
    /// See [`Expander::expand_from`].
    pub fn expand(
        &self,
        pattern: &RecurrencePattern,
        start: NaiveDate,
        end: NaiveDate,
        skip_days: &SkipDays,
    ) -> RecurrenceResult<Vec<NaiveDate>> {
        self.expand_from(pattern, start, start, end, skip_days)
    }

    /// ## Summary
    /// Expands `pattern`, anchored at `anchor`, over `[start, end]`.
    ///
    /// The result is strictly ascending and contains exactly the dates `d` in
    /// the range with `occurs_on(pattern, anchor, d)` that are not skip days.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::Range` if `end < start`, and
    /// `RecurrenceError::ExpansionLimit` if more than the configured number of
    /// stepping iterations would be needed. No partial result is returned.
    pub fn expand_from(
        &self,
        pattern: &RecurrencePattern,
        anchor: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
        skip_days: &SkipDays,
    ) -> RecurrenceResult<Vec<NaiveDate>> {
        if end < start {
            return Err(RecurrenceError::Range { start, end });
        }

        let end = match pattern.termination() {
            Some(Termination::Until(until)) => end.min(until),
            _ => end,
        };
        let lower = start.max(anchor);

        let mut stepper = Stepper {
            pattern,
            anchor,
            lower,
            end,
            budget: self.max_iterations,
            max_iterations: self.max_iterations,
            out: Vec::new(),
        };

        if lower <= end {
            match pattern.frequency() {
                Frequency::Unspecified => {}
                Frequency::Daily => stepper.daily()?,
                Frequency::Weekly => stepper.weekly()?,
                Frequency::Monthly => stepper.stepped(add_months, months_between(anchor, lower))?,
                Frequency::Yearly => stepper.stepped(
                    add_years,
                    i64::from(lower.year()) - i64::from(anchor.year()),
                )?,
            }
        }

        let total = stepper.out.len();
        let mut dates = stepper.out;
        dates.retain(|date| !skip_days.contains(date));

        tracing::debug!(
            rule = %pattern,
            %anchor,
            %start,
            %end,
            candidates = total,
            skipped = total - dates.len(),
            "Expanded recurrence"
        );

        Ok(dates)
    }
}

/// Mutable state of one expansion call.
struct Stepper<'a> {
    pattern: &'a RecurrencePattern,
    anchor: NaiveDate,
    lower: NaiveDate,
    end: NaiveDate,
    budget: u32,
    max_iterations: u32,
    out: Vec<NaiveDate>,
}

/// Outcome of offering one candidate.
enum Step {
    Continue,
    Stop,
}

impl Stepper<'_> {
    fn tick(&mut self) -> RecurrenceResult<()> {
        self.budget = self
            .budget
            .checked_sub(1)
            .ok_or(RecurrenceError::ExpansionLimit {
                max_iterations: self.max_iterations,
            })?;
        Ok(())
    }

    /// Records `date` if it lies in range and within the termination.
    fn offer(&mut self, date: NaiveDate) -> Step {
        if date > self.end {
            return Step::Stop;
        }
        if date < self.lower {
            return Step::Continue;
        }
        if let Some(Termination::Count(_)) = self.pattern.termination() {
            let within = occurrence_index(self.pattern, self.anchor, date)
                .is_some_and(|index| within_termination(self.pattern, date, index));
            if !within {
                return Step::Stop;
            }
        }
        self.out.push(date);
        Step::Continue
    }

    fn interval(&self) -> i64 {
        i64::from(self.pattern.interval().get())
    }

    fn daily(&mut self) -> RecurrenceResult<()> {
        let interval = self.interval();
        let mut period = ceil_div((self.lower - self.anchor).num_days(), interval);
        loop {
            self.tick()?;
            let Some(date) = offset_days(self.anchor, period * interval) else {
                return Ok(());
            };
            if let Step::Stop = self.offer(date) {
                return Ok(());
            }
            period += 1;
        }
    }

    fn weekly(&mut self) -> RecurrenceResult<()> {
        let interval = self.interval();
        let days = self.pattern.effective_weekdays(self.anchor);
        let first_week = week_start(self.anchor);
        let end = day_number(self.end);
        let mut period = ceil_div(weeks_between(self.anchor, self.lower), interval);
        loop {
            self.tick()?;
            // Day numbers, not dates: the anchor's Monday may precede
            // `NaiveDate::MIN`.
            let Some(monday) = period
                .checked_mul(interval * 7)
                .and_then(|offset| first_week.checked_add(offset))
            else {
                return Ok(());
            };
            if monday > end {
                return Ok(());
            }
            for weekday in monday_first(days) {
                self.tick()?;
                let day = monday + i64::from(weekday.num_days_from_monday());
                let Some(date) = from_day_number(day) else {
                    // Before the first representable date; later days may exist.
                    continue;
                };
                if let Step::Stop = self.offer(date) {
                    return Ok(());
                }
            }
            period += 1;
        }
    }

    /// Monthly and yearly stepping: `shift(anchor, n)` gives the candidate `n`
    /// units after the anchor, `offset` the units between anchor and range start.
    fn stepped(
        &mut self,
        shift: fn(NaiveDate, i64) -> Option<NaiveDate>,
        offset: i64,
    ) -> RecurrenceResult<()> {
        let interval = self.interval();
        let mut period = ceil_div(offset.max(0), interval);
        loop {
            self.tick()?;
            let Some(date) = shift(self.anchor, period * interval) else {
                return Ok(());
            };
            if let Step::Stop = self.offer(date) {
                return Ok(());
            }
            period += 1;
        }
    }
}

fn offset_days(from: NaiveDate, days: i64) -> Option<NaiveDate> {
    from.checked_add_days(Days::new(u64::try_from(days).ok()?))
}

/// ## Summary
/// Expands `pattern` over `[start, end]` anchored at `start`, using the default
/// iteration cap.
///
/// ## Errors
/// See [`Expander::expand_from`].
pub fn expand(
    pattern: &RecurrencePattern,
    start: NaiveDate,
    end: NaiveDate,
    skip_days: &SkipDays,
) -> RecurrenceResult<Vec<NaiveDate>> {
    Expander::default().expand(pattern, start, end, skip_days)
}

/// ## Summary
/// Expands `pattern` anchored at `anchor` over `[start, end]`, using the default
/// iteration cap.
///
/// ## Errors
/// See [`Expander::expand_from`].
pub fn expand_from(
    pattern: &RecurrencePattern,
    anchor: NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
    skip_days: &SkipDays,
) -> RecurrenceResult<Vec<NaiveDate>> {
    Expander::default().expand_from(pattern, anchor, start, end, skip_days)
}
