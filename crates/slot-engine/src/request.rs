//! JSON request envelope for callers that gather schedule and busy times
//! elsewhere (HTTP handlers, the CLI, the WASM bindings).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfiguration;
use crate::engine::{find_available_slots, TimeSlot};
use crate::error::{Result, SlotError};
use crate::schedule::{expand_recurring_shifts, RecurringShift};
use crate::timeline::Period;
use crate::wallclock::DaySchedule;

/// Everything one engine invocation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Appointment length in minutes.
    pub duration: u32,
    #[serde(default)]
    pub busy: Vec<Period>,
    /// Explicit shifts keyed by `YYYY-MM-DD`.
    #[serde(default)]
    pub schedule: DaySchedule,
    /// Recurring opening hours, expanded over the query range.
    #[serde(default)]
    pub recurring_shifts: Vec<RecurringShift>,
    /// Dates closed regardless of `schedule` and `recurring_shifts`.
    #[serde(default)]
    pub closed_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub config: EngineConfiguration,
    /// Durations the business offers, used for packing estimates.
    #[serde(default)]
    pub service_durations: Vec<u32>,
}

impl AvailabilityRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SlotError::InvalidRequest(e.to_string()))
    }

    /// The explicit schedule merged with expanded recurring shifts, minus closed dates.
    pub fn resolved_schedule(&self) -> Result<DaySchedule> {
        let mut schedule = self.schedule.clone();

        if !self.recurring_shifts.is_empty() {
            let tz = self.config.tz()?;
            let first_day = self.start.with_timezone(&tz).date_naive();
            let last_day = self.end.with_timezone(&tz).date_naive();
            schedule.extend(expand_recurring_shifts(
                &self.recurring_shifts,
                first_day,
                last_day,
                &[],
            )?);
        }

        for date in &self.closed_dates {
            schedule.close(*date);
        }
        Ok(schedule)
    }

    /// Validate and run the engine.
    pub fn run(&self) -> Result<Vec<TimeSlot>> {
        if self.end < self.start {
            return Err(SlotError::InvalidRequest(format!(
                "end {} is before start {}",
                self.end, self.start
            )));
        }
        let schedule = self.resolved_schedule()?;
        find_available_slots(
            self.start,
            self.end,
            self.duration,
            &self.busy,
            &schedule,
            &self.config,
            &self.service_durations,
        )
    }
}

/// Serialize slots as a JSON array of `{startAt, endAt, duration, priority}`.
pub fn slots_to_json(slots: &[TimeSlot], pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(slots)
    } else {
        serde_json::to_string(slots)
    };
    out.map_err(|e| SlotError::InvalidRequest(format!("serialization error: {}", e)))
}
