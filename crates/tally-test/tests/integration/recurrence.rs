//! Parsing, expansion and occurrence testing through the public API.

use chrono::{Datelike, Weekday};
use tally_test::recur::{Expander, RecurrenceError, SkipDays, build_summary, expand, occurs_on, parse_rule};

use super::helpers::date;

#[test_log::test]
fn daily_interval_with_skip_day() {
    let pattern = parse_rule("DAILY,2").unwrap();
    let skip: SkipDays = [date(2024, 1, 5)].into_iter().collect();

    let dates = expand(&pattern, date(2024, 1, 1), date(2024, 1, 10), &skip).unwrap();
    assert_eq!(
        dates,
        vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 7), date(2024, 1, 9)]
    );
}

#[test_log::test]
fn unspecified_rule_never_expands() {
    let pattern = parse_rule("UNSPECIFIED").unwrap();
    for (start, end) in [
        (date(2024, 1, 1), date(2024, 1, 1)),
        (date(2024, 1, 1), date(2024, 12, 31)),
        (date(1990, 6, 1), date(2090, 6, 1)),
    ] {
        assert!(expand(&pattern, start, end, &SkipDays::new()).unwrap().is_empty());
    }
}

#[test_log::test]
fn weekly_monday_wednesday_occurrences() {
    let pattern = parse_rule("FREQ=WEEKLY;BYDAY=MO,WE").unwrap();
    let anchor = date(2024, 1, 1);
    assert_eq!(anchor.weekday(), Weekday::Mon);

    let mut day = date(2023, 12, 1);
    while day <= date(2024, 12, 31) {
        let expected = day >= anchor && matches!(day.weekday(), Weekday::Mon | Weekday::Wed);
        assert_eq!(occurs_on(&pattern, anchor, day), expected, "{day}");
        day = day.succ_opt().unwrap();
    }
}

#[test_log::test]
fn expansion_is_sorted_unique_and_within_range() {
    let rules = [
        "DAILY",
        "DAILY,5",
        "WEEKLY,3",
        "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU,FR,SU",
        "MONTHLY",
        "MONTHLY,4",
        "YEARLY",
        "FREQ=DAILY;COUNT=17",
        "FREQ=WEEKLY;BYDAY=MO;UNTIL=20240601",
    ];
    let (start, end) = (date(2024, 1, 31), date(2026, 3, 1));
    let skip: SkipDays = [date(2024, 2, 29), date(2024, 3, 5)].into_iter().collect();

    for rule in rules {
        let pattern = parse_rule(rule).unwrap();
        let dates = expand(&pattern, start, end, &skip).unwrap();

        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]), "{rule}");
        assert!(dates.iter().all(|day| (start..=end).contains(day)), "{rule}");
        assert!(dates.iter().all(|day| !skip.contains(day)), "{rule}");
        assert!(dates.iter().all(|day| occurs_on(&pattern, start, *day)), "{rule}");
    }
}

#[test_log::test]
fn inverted_range_is_rejected() {
    let pattern = parse_rule("DAILY").unwrap();
    let err = expand(&pattern, date(2024, 2, 1), date(2024, 1, 1), &SkipDays::new()).unwrap_err();
    assert_eq!(
        err,
        RecurrenceError::Range {
            start: date(2024, 2, 1),
            end: date(2024, 1, 1)
        }
    );
}

#[test_log::test]
fn iteration_cap_bounds_work() {
    let pattern = parse_rule("DAILY").unwrap();
    let expander = Expander::new(100);

    assert_eq!(
        expander
            .expand(&pattern, date(2024, 1, 1), date(2024, 2, 1), &SkipDays::new())
            .unwrap()
            .len(),
        32
    );
    assert_eq!(
        expander.expand(&pattern, date(2024, 1, 1), date(2025, 1, 1), &SkipDays::new()),
        Err(RecurrenceError::ExpansionLimit { max_iterations: 100 })
    );
}

#[test_log::test]
fn summary_describes_rule() {
    let pattern = parse_rule("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE").unwrap();
    assert_eq!(
        build_summary(&pattern, date(2024, 1, 1), Some(date(2024, 6, 1))),
        "every 2 weeks on Mon/Wed from 2024-01-01 to 2024-06-01"
    );
}
