//! Slot-start policy: which instants inside a window may begin an appointment.
//!
//! Grids are evaluated on local 5-minute marks in the configured zone. Every
//! supported step divides 60 and is a multiple of 5, so filtering the marks by
//! minute-of-hour reproduces each grid exactly, even across DST transitions.

use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;

use crate::config::{EngineConfiguration, SlotStart, SMART_STEPS};
use crate::dst::resolve_local;
use crate::error::Result;

/// Spacing of the finest grid any policy can produce.
pub const MARK_MINUTES: i64 = 5;

/// A slot-start policy bound to a configuration and its parsed zone.
#[derive(Debug, Clone)]
pub struct SlotStartPolicy<'a> {
    config: &'a EngineConfiguration,
    tz: Tz,
}

impl<'a> SlotStartPolicy<'a> {
    /// Bind `config`, parsing its time zone.
    pub fn new(config: &'a EngineConfiguration) -> Result<Self> {
        Ok(Self::with_tz(config, config.tz()?))
    }

    pub fn with_tz(config: &'a EngineConfiguration, tz: Tz) -> Self {
        Self { config, tz }
    }

    /// Legal start instants in `[window_start, window_end)`, sorted and de-duplicated.
    pub fn candidate_starts(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Vec<DateTime<Utc>> {
        if window_start >= window_end {
            return Vec::new();
        }

        let mut starts: Vec<DateTime<Utc>> = match self.config.slot_start.step_minutes() {
            Some(step) => {
                let steps = self.grid_steps(step);
                self.marks(window_start, window_end)
                    .filter(|t| {
                        let minute = self.local_minute(*t);
                        steps.iter().any(|s| minute % s == 0)
                    })
                    .collect()
            }
            None => {
                let mut custom = self.custom_starts(window_start, window_end);
                if self.config.allow_smart_slot_starts {
                    custom.extend(self.marks(window_start, window_end));
                }
                custom
            }
        };

        starts.sort();
        starts.dedup();
        starts
    }

    /// Whether `instant` lies on the primary grid, i.e. would be produced
    /// with smart slot starts disabled.
    pub fn is_primary_start(&self, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&self.tz);
        if local.second() != 0 || local.nanosecond() != 0 {
            return false;
        }
        match self.config.slot_start {
            SlotStart::Custom => {
                let minute_of_day = local.hour() * 60 + local.minute();
                self.config
                    .custom_slots
                    .iter()
                    .any(|slot| slot.minutes_from_midnight() == minute_of_day)
            }
            other => other
                .step_minutes()
                .is_some_and(|step| local.minute() % step == 0),
        }
    }

    /// The primary step plus, with smart starts, every finer step dividing it.
    fn grid_steps(&self, step: u32) -> Vec<u32> {
        let mut steps = vec![step];
        if self.config.allow_smart_slot_starts {
            steps.extend(
                SMART_STEPS
                    .iter()
                    .copied()
                    .filter(|s| *s != step && step % s == 0),
            );
        }
        steps
    }

    fn local_minute(&self, instant: DateTime<Utc>) -> u32 {
        instant.with_timezone(&self.tz).minute()
    }

    /// Every local 5-minute mark in `[start, end)`.
    fn marks(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Iterator<Item = DateTime<Utc>> {
        let local = start.with_timezone(&self.tz);
        let mut first = start
            - Duration::minutes(i64::from(local.minute()) % MARK_MINUTES)
            - Duration::seconds(i64::from(local.second()))
            - Duration::nanoseconds(i64::from(local.nanosecond()));
        if first < start {
            first += Duration::minutes(MARK_MINUTES);
        }
        std::iter::successors(Some(first), |t| Some(*t + Duration::minutes(MARK_MINUTES)))
            .take_while(move |t| *t < end)
    }

    /// Custom wall-clock starts on every local date touched by the window.
    fn custom_starts(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let first_day = start.with_timezone(&self.tz).date_naive();
        let last_day = end.with_timezone(&self.tz).date_naive();
        let tz = self.tz;
        let policy = self.config.dst_policy;
        let slots = &self.config.custom_slots;

        first_day
            .iter_days()
            .take_while(|day| *day <= last_day)
            .flat_map(move |day| {
                slots.iter().filter_map(move |slot| {
                    resolve_local(&tz, day.and_time(slot.to_naive_time()), policy)
                })
            })
            .filter(|t| *t >= start && *t < end)
            .collect()
    }
}

/// Convenience wrapper: legal starts in `[window_start, window_end)` under `config`.
pub fn candidate_starts(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    config: &EngineConfiguration,
) -> Result<Vec<DateTime<Utc>>> {
    Ok(SlotStartPolicy::new(config)?.candidate_starts(window_start, window_end))
}
