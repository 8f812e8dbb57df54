//! Availability engine: days → shifts → gaps → scored candidate slots.
//!
//! A single deterministic pass over caller-supplied data. Each stage is a pure
//! function returning a fresh list; the engine only concatenates. Days never
//! read each other's data, so callers may shard a long range by date and
//! concatenate the results.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfiguration;
use crate::dst::resolve_local;
use crate::error::{Result, SlotError};
use crate::packer::GapPacker;
use crate::scorer::{ScoredSlot, ShiftContext, SlotScorer};
use crate::slot_start::SlotStartPolicy;
use crate::timeline::{self, Gap, Period};
use crate::wallclock::{DaySchedule, Shift};

/// Tie-break bonus base for the best-packing slots of a gap.
const BEST_PACKING_BONUS: f64 = 3.0;

/// A bookable slot proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Minutes; always `end_at - start_at`.
    pub duration: u32,
    pub priority: f64,
}

/// Compute every bookable start in `[query_start, query_end]` for an
/// appointment of `duration` minutes.
///
/// Output is ordered by day, then shift declaration order, then gap, then
/// start time. An empty `all_service_durations` disables packing-based
/// scoring terms.
///
/// # Errors
/// Returns `SlotError::InvalidDuration` for a zero duration,
/// `SlotError::InvalidPeriod` for a busy period ending before it starts, and
/// `SlotError::InvalidConfig` / `SlotError::InvalidTimezone` when the
/// configuration does not validate.
pub fn find_available_slots(
    query_start: DateTime<Utc>,
    query_end: DateTime<Utc>,
    duration: u32,
    busy_periods: &[Period],
    schedule: &DaySchedule,
    config: &EngineConfiguration,
    all_service_durations: &[u32],
) -> Result<Vec<TimeSlot>> {
    if duration == 0 {
        return Err(SlotError::InvalidDuration(
            "appointment duration must be positive".to_string(),
        ));
    }
    if let Some(p) = busy_periods.iter().find(|p| p.end_at < p.start_at) {
        return Err(SlotError::InvalidPeriod(format!(
            "end {} is before start {}",
            p.end_at, p.start_at
        )));
    }
    config.validate()?;
    let tz = config.tz()?;

    if query_start >= query_end {
        return Ok(Vec::new());
    }

    let anchor_config = config.without_smart_starts();
    let policy = SlotStartPolicy::with_tz(config, tz);
    let anchor_policy = SlotStartPolicy::with_tz(&anchor_config, tz);
    let packer = GapPacker::new(all_service_durations, config);

    let engine = Engine {
        query_start,
        query_end,
        duration,
        busy_periods,
        config,
        tz,
        policy: &policy,
        anchor_policy: &anchor_policy,
        scorer: SlotScorer::new(config, &policy, &packer, duration),
    };
    let engine = &engine;

    let first_day = query_start.with_timezone(&tz).date_naive();
    let last_day = query_end.with_timezone(&tz).date_naive();

    let slots: Vec<TimeSlot> = first_day
        .iter_days()
        .take_while(|day| *day <= last_day)
        .flat_map(|day| {
            schedule
                .shifts_on(day)
                .iter()
                .flat_map(move |shift| engine.slots_for_shift(day, shift))
                .collect::<Vec<_>>()
        })
        .collect();

    debug!(
        %query_start,
        %query_end,
        duration,
        slots = slots.len(),
        "availability computed"
    );
    Ok(slots)
}

struct Engine<'a> {
    query_start: DateTime<Utc>,
    query_end: DateTime<Utc>,
    duration: u32,
    busy_periods: &'a [Period],
    config: &'a EngineConfiguration,
    tz: Tz,
    policy: &'a SlotStartPolicy<'a>,
    anchor_policy: &'a SlotStartPolicy<'a>,
    scorer: SlotScorer<'a>,
}

impl Engine<'_> {
    fn slot_length(&self) -> Duration {
        Duration::minutes(i64::from(self.duration))
    }

    fn slots_for_shift(&self, day: NaiveDate, shift: &Shift) -> Vec<TimeSlot> {
        let policy = self.config.dst_policy;
        let bounds = resolve_local(&self.tz, day.and_time(shift.start.to_naive_time()), policy)
            .zip(resolve_local(&self.tz, day.and_time(shift.end.to_naive_time()), policy));
        let Some((work_start, work_end)) = bounds.filter(|(s, e)| s < e) else {
            debug!(%day, start = %shift.start, end = %shift.end, "shift skipped: no valid local bounds");
            return Vec::new();
        };

        let timeline = timeline::build_timeline(work_start, work_end, self.busy_periods);

        let anchors: Vec<DateTime<Utc>> = self
            .anchor_policy
            .candidate_starts(work_start, work_end)
            .into_iter()
            .filter(|t| *t + self.slot_length() <= work_end)
            .collect();
        let context = ShiftContext {
            first_valid_start: anchors.first().copied(),
            last_valid_start: anchors.last().copied(),
        };

        let gaps = timeline::gaps(&timeline);
        let slots: Vec<TimeSlot> = gaps
            .iter()
            .flat_map(|gap| self.slots_for_gap(gap, &context))
            .collect();

        debug!(
            %day,
            start = %shift.start,
            end = %shift.end,
            gaps = gaps.len(),
            slots = slots.len(),
            "shift processed"
        );
        slots
    }

    fn slots_for_gap(&self, gap: &Gap, context: &ShiftContext) -> Vec<TimeSlot> {
        let scored: Vec<ScoredSlot> = self
            .policy
            .candidate_starts(gap.start, gap.end)
            .into_iter()
            .filter(|start| {
                let end = *start + self.slot_length();
                end <= gap.end && *start >= self.query_start && end <= self.query_end
            })
            .filter_map(|start| self.scorer.score(start, gap, context))
            .collect();

        if self.config.filter_low_priority_slots {
            keep_best_packing(scored, self.duration)
        } else {
            scored
                .into_iter()
                .map(|s| to_time_slot(&s, self.duration, f64::from(s.priority)))
                .collect()
        }
    }
}

/// Boost the slots leaving room for the most further appointments, then keep
/// only those sharing the highest resulting priority.
///
/// The boost is `3 + 1/weight`, so among equal counts a packing of fewer,
/// longer services wins. A zero weight gets no reciprocal term.
fn keep_best_packing(scored: Vec<ScoredSlot>, duration: u32) -> Vec<TimeSlot> {
    let Some(max_appointments) = scored.iter().map(|s| s.packing.count).max() else {
        return Vec::new();
    };

    let boosted: Vec<TimeSlot> = scored
        .iter()
        .map(|s| {
            let mut priority = f64::from(s.priority);
            if s.packing.count == max_appointments {
                priority += BEST_PACKING_BONUS;
                if s.packing.total_weight > 0 {
                    priority += 1.0 / f64::from(s.packing.total_weight);
                }
            }
            to_time_slot(s, duration, priority)
        })
        .collect();

    let best = boosted
        .iter()
        .map(|s| s.priority)
        .fold(f64::NEG_INFINITY, f64::max);

    boosted
        .into_iter()
        .filter(|s| (s.priority - best).abs() < f64::EPSILON)
        .collect()
}

fn to_time_slot(scored: &ScoredSlot, duration: u32, priority: f64) -> TimeSlot {
    TimeSlot {
        start_at: scored.start_at,
        end_at: scored.end_at,
        duration,
        priority,
    }
}
