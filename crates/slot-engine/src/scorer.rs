//! Slot scoring: break checks, edge detection and the priority heuristic.
//!
//! A candidate either fails the hard break filter (dropped) or receives an
//! integer priority plus the packing estimate for the free time it leaves on
//! either side, which the engine uses for per-gap rescoring.

use chrono::{DateTime, Duration, Utc};
use tracing::trace;

use crate::config::EngineConfiguration;
use crate::packer::{GapPacker, Packing};
use crate::slot_start::SlotStartPolicy;
use crate::timeline::Gap;

/// A start this close to a shift's first (or end this close to its last)
/// valid slot counts as sitting on the shift edge.
pub const SHIFT_EDGE_TOLERANCE_MINUTES: i64 = 5;

/// Bonus for starts on the primary slot-start grid.
const GRID_BONUS: i32 = 3;

/// Shift-wide reference points for edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftContext {
    /// First primary-grid start whose slot fits in the shift.
    pub first_valid_start: Option<DateTime<Utc>>,
    /// Last primary-grid start whose slot fits in the shift.
    pub last_valid_start: Option<DateTime<Utc>>,
}

/// A candidate that survived the break filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredSlot {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub priority: i32,
    /// Packing estimate for the free time before and after the slot, summed.
    pub packing: Packing,
}

/// Scores candidates of one appointment duration.
#[derive(Debug, Clone)]
pub struct SlotScorer<'a> {
    config: &'a EngineConfiguration,
    policy: &'a SlotStartPolicy<'a>,
    packer: &'a GapPacker,
    duration: Duration,
}

impl<'a> SlotScorer<'a> {
    pub fn new(
        config: &'a EngineConfiguration,
        policy: &'a SlotStartPolicy<'a>,
        packer: &'a GapPacker,
        duration_minutes: u32,
    ) -> Self {
        Self {
            config,
            policy,
            packer,
            duration: Duration::minutes(i64::from(duration_minutes)),
        }
    }

    /// Score a slot starting at `slot_start` inside `gap`.
    ///
    /// Returns `None` when a break constraint fails and breaks may not be skipped.
    pub fn score(
        &self,
        slot_start: DateTime<Utc>,
        gap: &Gap,
        shift: &ShiftContext,
    ) -> Option<ScoredSlot> {
        let config = self.config;
        let slot_end = slot_start + self.duration;
        let gap_before = (slot_start - gap.start).num_minutes();
        let gap_after = (gap.end - slot_end).num_minutes();
        let break_minutes = i64::from(config.break_duration);

        let is_to_shift_start = shift
            .first_valid_start
            .is_some_and(|first| within_tolerance(slot_start, first));
        let is_to_shift_end = shift
            .last_valid_start
            .is_some_and(|last| within_tolerance(slot_end, last + self.duration));

        let other_service_fits = self.packer.any_fits(gap_before) || self.packer.any_fits(gap_after);

        let has_break_before = is_to_shift_start || gap_before >= break_minutes;
        // A trailing break only matters if something could use the space after it.
        let has_break_after = is_to_shift_end || gap_after >= break_minutes || !other_service_fits;
        let break_violated = !has_break_before || !has_break_after;

        if break_violated && !config.allow_skip_break {
            trace!(%slot_start, gap_before, gap_after, "candidate dropped by break filter");
            return None;
        }

        let mut priority = 0;
        if self.policy.is_primary_start(slot_start) {
            priority += GRID_BONUS;
        }
        if has_break_before {
            priority += 1;
        }
        if has_break_after {
            priority += 1;
        }

        if config.prefer_back_to_back {
            let back_to_back_before =
                gap.busy_before && gap_before <= break_minutes && !is_to_shift_start;
            let back_to_back_after = gap.busy_after && gap_after <= break_minutes && !is_to_shift_end;
            if back_to_back_before || back_to_back_after {
                priority += 1;
            }
        }

        if config.lower_priority_if_no_following_booking && !other_service_fits {
            priority -= 1;
        }

        if config.allow_skip_break && break_violated {
            priority -= 1;
        }

        if config.discourage_large_gaps && !other_service_fits {
            let lenient_before = config.prefer_back_to_back && !gap.busy_before;
            let lenient_after = config.prefer_back_to_back && !gap.busy_after;
            priority -= large_gap_penalty(gap_before, lenient_before);
            priority -= large_gap_penalty(gap_after, lenient_after);
        }

        Some(ScoredSlot {
            start_at: slot_start,
            end_at: slot_end,
            priority,
            packing: self.packer.fit(gap_before) + self.packer.fit(gap_after),
        })
    }
}

fn within_tolerance(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    (a - b).num_minutes().abs() <= SHIFT_EDGE_TOLERANCE_MINUTES
}

/// Tiered penalty for free time nothing else can fill. `lenient` applies to
/// sides that run up to a shift edge, which can only be filled from one side.
pub fn large_gap_penalty(minutes: i64, lenient: bool) -> i32 {
    match (minutes, lenient) {
        (m, false) if m > 120 => 3,
        (m, false) if m > 60 => 2,
        (m, false) if m > 30 => 1,
        (m, true) if m > 120 => 2,
        (m, true) if m > 60 => 1,
        _ => 0,
    }
}
