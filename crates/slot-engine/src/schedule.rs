//! Recurring-shift expansion: RRULE-based opening hours → [`DaySchedule`].
//!
//! Wraps the `rrule` crate. Each rule contributes one shift on every date its
//! recurrence lands on within an inclusive date range.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::wallclock::{DaySchedule, Shift, WallClockTime};

/// Most occurrences one rule may expand to.
const MAX_OCCURRENCES: u16 = u16::MAX;

/// Opening hours that repeat, e.g. Monday-Friday 09:00-17:00.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringShift {
    /// RFC 5545 RRULE, e.g. `"FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR"`.
    pub rrule: String,
    pub start: WallClockTime,
    pub end: WallClockTime,
}

impl RecurringShift {
    pub fn new(rrule: &str, start: &str, end: &str) -> Result<Self> {
        let shift = Shift::parse(start, end)?;
        Ok(Self {
            rrule: rrule.to_string(),
            start: shift.start,
            end: shift.end,
        })
    }
}

/// Expand recurring shifts into a per-date schedule over `[range_start, range_end]`.
///
/// Shifts landing on the same date are ordered by start time (rule order
/// breaks ties). Dates in `closed` are removed afterwards.
///
/// # Errors
/// Returns `SlotError::InvalidRule` for an empty or unparseable RRULE and
/// `SlotError::InvalidShift` when a rule's end is not after its start.
pub fn expand_recurring_shifts(
    rules: &[RecurringShift],
    range_start: NaiveDate,
    range_end: NaiveDate,
    closed: &[NaiveDate],
) -> Result<DaySchedule> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Shift>> = BTreeMap::new();

    for rule in rules {
        let shift = Shift::new(rule.start, rule.end)?;
        for date in expand_rule_dates(&rule.rrule, range_start, range_end)? {
            by_date.entry(date).or_default().push(shift);
        }
    }

    let mut schedule = DaySchedule::new();
    for (date, mut shifts) in by_date {
        if closed.contains(&date) {
            continue;
        }
        shifts.sort_by_key(|s| s.start);
        for shift in shifts {
            schedule.add_shift(date, shift);
        }
    }
    Ok(schedule)
}

/// Dates within `[range_start, range_end]` on which `rrule` recurs.
pub fn expand_rule_dates(
    rrule: &str,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    let rule = rrule.trim().trim_start_matches("RRULE:");
    if rule.is_empty() {
        return Err(SlotError::InvalidRule("empty RRULE string".to_string()));
    }
    if range_end < range_start {
        return Ok(Vec::new());
    }

    // Bound the recurrence by the range unless the rule already bounds itself.
    // The rrule crate requires a UTC UNTIL ("...Z") when DTSTART is UTC.
    let upper = rule.to_uppercase();
    let mut rule_str = rule.to_string();
    if !upper.contains("UNTIL=") && !upper.contains("COUNT=") {
        rule_str = format!("{};UNTIL={}", rule_str, range_end.format("%Y%m%dT235959Z"));
    }

    let rrule_text = format!(
        "DTSTART;TZID=UTC:{}\nRRULE:{}",
        range_start.format("%Y%m%dT000000"),
        rule_str
    );
    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| SlotError::InvalidRule(format!("{}", e)))?;

    let expansion = rrule_set.all(MAX_OCCURRENCES);
    let mut dates: Vec<NaiveDate> = expansion
        .dates
        .into_iter()
        .map(|dt| dt.date_naive())
        .filter(|d| *d >= range_start && *d <= range_end)
        .collect();

    // Hitting the cap only matters if it cut the expansion short of the range.
    if expansion.limited && !dates.last().is_some_and(|last| *last >= range_end) {
        return Err(SlotError::InvalidRule(format!(
            "'{}' recurs more than {} times before {}",
            rule, MAX_OCCURRENCES, range_end
        )));
    }

    dates.dedup();
    Ok(dates)
}
