//! Argument parsing and execution for the `tally` binary.
//!
//! Dates are `YYYY-MM-DD`; `<start>` of `split` and `buckets` is RFC 3339.

use std::fmt::Write as _;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Days, NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tally_bucket::{
    BucketAggregator, BucketStore, Direction, InMemoryBucketStore, split_by_local_day,
};
use tally_core::config::Settings;
use tally_recur::{Expander, Frequency, SkipDays, build_summary, parse_rule};

/// Days expanded when `expand` is given no end date.
const DEFAULT_HORIZON_DAYS: u64 = 365;

#[derive(Debug, Parser)]
#[command(name = "tally", about = "Recurrence expansion and time bucketing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Expand a recurrence rule into dates
    Expand(ExpandArgs),
    /// Split a tracked span at local midnights
    Split(SpanArgs),
    /// Show the bucket totals a tracked span produces
    Buckets(BucketArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ExpandArgs {
    /// Rule in RRULE or legacy `FREQ[,INTERVAL]` form
    pub rule: String,
    /// First date of the range
    #[arg(value_parser = parse_date)]
    pub start: NaiveDate,
    /// Last date of the range, a year after `start` if omitted
    #[arg(value_parser = parse_date)]
    pub end: Option<NaiveDate>,
    /// Date the cadence is measured from, `start` if omitted
    #[arg(long, value_parser = parse_date)]
    pub anchor: Option<NaiveDate>,
    /// Date to leave out of the result; repeatable
    #[arg(long = "skip", action = ArgAction::Append, value_parser = parse_date)]
    pub skip_days: Vec<NaiveDate>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct SpanArgs {
    /// Span start as an RFC 3339 instant
    #[arg(value_parser = parse_instant)]
    pub start: DateTime<Utc>,
    pub minutes: u32,
    /// IANA zone name
    pub timezone: String,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct BucketArgs {
    #[command(flatten)]
    pub span: SpanArgs,
    #[arg(long, default_value_t = 0)]
    pub user: i64,
    #[arg(long, default_value_t = 0)]
    pub label: i64,
}

#[derive(Serialize)]
struct ExpandReport {
    rule: String,
    frequency: Frequency,
    summary: String,
    occurrences: Vec<NaiveDate>,
}

#[derive(Serialize)]
struct SegmentReport {
    local_start: String,
    local_date: NaiveDate,
    minutes: u32,
}

#[derive(Serialize)]
struct BucketReport {
    granularity: String,
    period_year: i32,
    period_value: u32,
    minutes: i64,
}

impl Command {
    /// ## Summary
    /// Runs the command and returns what it prints.
    ///
    /// ## Errors
    /// Returns the underlying parse, expansion or bucketing error.
    pub async fn run(&self, settings: &Settings) -> Result<String> {
        match self {
            Self::Expand(args) => run_expand(args, settings),
            Self::Split(args) => run_split(args),
            Self::Buckets(args) => run_buckets(args).await,
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{value}', expected YYYY-MM-DD: {e}"))
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|start| start.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 instant '{value}': {e}"))
}

fn run_expand(args: &ExpandArgs, settings: &Settings) -> Result<String> {
    let pattern = parse_rule(&args.rule)?;
    let anchor = args.anchor.unwrap_or(args.start);
    let end = match args.end {
        Some(end) => end,
        None => args
            .start
            .checked_add_days(Days::new(DEFAULT_HORIZON_DAYS))
            .ok_or_else(|| anyhow!("no default end after {}", args.start))?,
    };

    let expander = Expander::from_config(&settings.recurrence);
    let skip_days: SkipDays = args.skip_days.iter().copied().collect();
    let occurrences = expander.expand_from(&pattern, anchor, args.start, end, &skip_days)?;
    let summary = build_summary(&pattern, anchor, args.end);

    if args.json {
        let report = ExpandReport {
            rule: pattern.to_string(),
            frequency: pattern.frequency(),
            summary,
            occurrences,
        };
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let mut out = summary;
    for date in &occurrences {
        out.push('\n');
        out.push_str(&date.format("%Y-%m-%d").to_string());
    }
    Ok(out)
}

fn run_split(args: &SpanArgs) -> Result<String> {
    let segments = split_by_local_day(args.start, args.minutes, &args.timezone)?;
    let reports: Vec<_> = segments
        .iter()
        .map(|segment| SegmentReport {
            local_start: segment.local_start.to_rfc3339(),
            local_date: segment.local_date(),
            minutes: segment.minutes,
        })
        .collect();

    if args.json {
        return Ok(serde_json::to_string_pretty(&reports)?);
    }

    let mut out = String::new();
    for report in &reports {
        writeln!(out, "{}\t{} min", report.local_start, report.minutes)?;
    }
    Ok(out.trim_end().to_string())
}

async fn run_buckets(args: &BucketArgs) -> Result<String> {
    let span = &args.span;
    let aggregator = BucketAggregator::new(InMemoryBucketStore::new());
    let touched = aggregator
        .adjust_buckets(
            args.user.into(),
            args.label.into(),
            "cli",
            span.start,
            span.minutes,
            &span.timezone,
            Direction::Apply,
        )
        .await?;

    let mut reports = Vec::with_capacity(touched.len());
    for key in &touched {
        let minutes = aggregator
            .store()
            .get(key)
            .await?
            .map_or(0, |bucket| bucket.duration_minutes);
        reports.push(BucketReport {
            granularity: key.granularity.to_string(),
            period_year: key.period_year,
            period_value: key.period_value,
            minutes,
        });
    }

    if span.json {
        return Ok(serde_json::to_string_pretty(&reports)?);
    }

    let mut out = String::new();
    for report in &reports {
        writeln!(
            out,
            "{}\t{}/{}\t{} min",
            report.granularity, report.period_year, report.period_value, report.minutes
        )?;
    }
    Ok(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn command(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("tally").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    fn rejected(args: &[&str]) -> ErrorKind {
        Cli::try_parse_from(std::iter::once("tally").chain(args.iter().copied()))
            .unwrap_err()
            .kind()
    }

    #[test]
    fn parses_expand_with_flags() {
        let command = command(&[
            "expand",
            "DAILY,2",
            "2024-01-01",
            "2024-01-10",
            "--skip",
            "2024-01-05",
            "--skip",
            "2024-01-07",
            "--json",
        ]);

        let Command::Expand(args) = command else {
            panic!("expected expand, got {command:?}");
        };
        assert_eq!(args.rule, "DAILY,2");
        assert_eq!(args.start, date(2024, 1, 1));
        assert_eq!(args.end, Some(date(2024, 1, 10)));
        assert_eq!(args.skip_days, vec![date(2024, 1, 5), date(2024, 1, 7)]);
        assert!(args.json);
        assert_eq!(args.anchor, None);
    }

    #[test]
    fn parses_span_instant_in_any_offset() {
        let Command::Split(args) = command(&["split", "2024-05-10T20:30:00-03:00", "90", "UTC"]) else {
            panic!("expected split");
        };
        assert_eq!(args.start, DateTime::parse_from_rfc3339("2024-05-10T23:30:00Z").unwrap());
        assert_eq!(args.minutes, 90);
        assert!(!args.json);
    }

    #[test]
    fn buckets_identity_defaults_to_zero() {
        let Command::Buckets(args) = command(&["buckets", "2024-05-10T23:30:00Z", "90", "UTC"]) else {
            panic!("expected buckets");
        };
        assert_eq!((args.user, args.label), (0, 0));

        let Command::Buckets(args) = command(&[
            "buckets",
            "2024-05-10T23:30:00Z",
            "90",
            "UTC",
            "--user",
            "7",
            "--label",
            "3",
        ]) else {
            panic!("expected buckets");
        };
        assert_eq!((args.user, args.label), (7, 3));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["tally"]).is_err());
        assert_eq!(rejected(&["frobnicate"]), ErrorKind::InvalidSubcommand);
        assert_eq!(rejected(&["expand", "DAILY"]), ErrorKind::MissingRequiredArgument);
        assert_eq!(rejected(&["expand", "DAILY", "2024-13-01"]), ErrorKind::ValueValidation);
        assert_eq!(
            rejected(&["expand", "DAILY", "2024-01-01", "--skip"]),
            ErrorKind::InvalidValue
        );
        assert_eq!(
            rejected(&["expand", "DAILY", "2024-01-01", "--frobnicate"]),
            ErrorKind::UnknownArgument
        );
        assert!(Cli::try_parse_from(["tally", "split", "2024-01-01T00:00:00Z", "-5", "UTC"]).is_err());
        assert_eq!(
            rejected(&["split", "2024-01-01T00:00:00Z", "five", "UTC"]),
            ErrorKind::ValueValidation
        );
        assert_eq!(rejected(&["split", "yesterday", "5", "UTC"]), ErrorKind::ValueValidation);
        assert_eq!(rejected(&["--help"]), ErrorKind::DisplayHelp);
    }

    #[test_log::test(tokio::test)]
    async fn expand_prints_summary_and_dates() {
        let command = command(&[
            "expand",
            "DAILY,2",
            "2024-01-01",
            "2024-01-10",
            "--skip",
            "2024-01-05",
        ]);
        let output = command.run(&Settings::default()).await.unwrap();
        assert_eq!(
            output,
            "every 2 days from 2024-01-01 to 2024-01-10\n2024-01-01\n2024-01-03\n2024-01-07\n2024-01-09"
        );
    }

    #[test_log::test(tokio::test)]
    async fn expand_json_report() {
        let command = command(&["expand", "WEEKLY", "2024-01-01", "2024-01-15", "--json"]);
        let output = command.run(&Settings::default()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["frequency"], "WEEKLY");
        assert_eq!(value["rule"], "FREQ=WEEKLY");
        assert_eq!(
            value["occurrences"],
            serde_json::json!(["2024-01-01", "2024-01-08", "2024-01-15"])
        );
    }

    #[test_log::test(tokio::test)]
    async fn expand_respects_configured_cap() {
        let mut settings = Settings::default();
        settings.recurrence.max_iterations = 5;
        let command = command(&["expand", "DAILY", "2024-01-01", "2024-12-31"]);
        assert!(command.run(&settings).await.is_err());
    }

    #[test_log::test(tokio::test)]
    async fn split_prints_segments() {
        let command = command(&["split", "2024-05-10T23:30:00Z", "90", "UTC"]);
        let output = command.run(&Settings::default()).await.unwrap();
        assert_eq!(
            output,
            "2024-05-10T23:30:00+00:00\t30 min\n2024-05-11T00:00:00+00:00\t60 min"
        );
    }

    #[test_log::test(tokio::test)]
    async fn buckets_prints_totals() {
        let command = command(&["buckets", "2024-05-10T23:30:00Z", "90", "UTC", "--label", "3"]);
        let output = command.run(&Settings::default()).await.unwrap();
        assert_eq!(
            output,
            "DAY\t2024/20240510\t30 min\nDAY\t2024/20240511\t60 min\nWEEK\t2024/19\t90 min\nMONTH\t2024/5\t90 min"
        );
    }
}
