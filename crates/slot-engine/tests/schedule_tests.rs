//! Tests for recurring-shift expansion.

use chrono::NaiveDate;
use slot_engine::error::SlotError;
use slot_engine::schedule::{expand_recurring_shifts, expand_rule_dates, RecurringShift};
use slot_engine::wallclock::Shift;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

#[test]
fn weekly_byday_lands_on_listed_weekdays() {
    // 2026-03-02 is a Monday.
    let dates = expand_rule_dates("FREQ=WEEKLY;BYDAY=MO,WE,FR", date(2), date(8)).unwrap();
    assert_eq!(dates, vec![date(2), date(4), date(6)]);
}

#[test]
fn range_end_is_inclusive() {
    let dates = expand_rule_dates("FREQ=DAILY", date(2), date(4)).unwrap();
    assert_eq!(dates, vec![date(2), date(3), date(4)]);
}

#[test]
fn rrule_prefix_is_accepted() {
    let dates = expand_rule_dates("RRULE:FREQ=WEEKLY;BYDAY=TU", date(2), date(15)).unwrap();
    assert_eq!(dates, vec![date(3), date(10)]);
}

#[test]
fn inverted_range_is_empty() {
    assert!(expand_rule_dates("FREQ=DAILY", date(5), date(2)).unwrap().is_empty());
}

#[test]
fn empty_and_malformed_rules_are_rejected() {
    assert!(matches!(
        expand_rule_dates("", date(2), date(8)),
        Err(SlotError::InvalidRule(_))
    ));
    assert!(matches!(
        expand_rule_dates("FREQ=SOMETIMES", date(2), date(8)),
        Err(SlotError::InvalidRule(_))
    ));
}

#[test]
fn split_days_are_ordered_by_start() {
    let rules = vec![
        RecurringShift::new("FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR", "13:00", "17:00").unwrap(),
        RecurringShift::new("FREQ=WEEKLY;BYDAY=MO,WE", "08:00", "12:00").unwrap(),
    ];
    let schedule = expand_recurring_shifts(&rules, date(2), date(8), &[]).unwrap();

    assert_eq!(
        schedule.shifts_on(date(2)),
        &[
            Shift::parse("08:00", "12:00").unwrap(),
            Shift::parse("13:00", "17:00").unwrap(),
        ]
    );
    assert_eq!(schedule.shifts_on(date(3)), &[Shift::parse("13:00", "17:00").unwrap()]);
    assert!(schedule.shifts_on(date(7)).is_empty(), "Saturday is closed");
}

#[test]
fn closed_dates_are_removed() {
    let rules = vec![RecurringShift::new("FREQ=DAILY", "09:00", "17:00").unwrap()];
    let schedule = expand_recurring_shifts(&rules, date(2), date(4), &[date(3)]).unwrap();
    assert_eq!(schedule.dates().collect::<Vec<_>>(), vec![date(2), date(4)]);
}

#[test]
fn inverted_shift_is_rejected() {
    assert!(matches!(
        RecurringShift::new("FREQ=DAILY", "17:00", "09:00"),
        Err(SlotError::InvalidShift(_))
    ));
}

#[test]
fn expansion_cut_short_by_the_occurrence_cap_is_an_error() {
    // Hourly for a decade is far more occurrences than one rule may expand to.
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2035, 12, 31).unwrap();
    assert!(matches!(
        expand_rule_dates("FREQ=HOURLY", start, end),
        Err(SlotError::InvalidRule(_))
    ));
}

#[test]
fn long_until_past_the_range_is_not_truncated() {
    let dates = expand_rule_dates("FREQ=HOURLY;UNTIL=20991231T000000Z", date(2), date(3)).unwrap();
    assert_eq!(dates, vec![date(2), date(3)]);
}
