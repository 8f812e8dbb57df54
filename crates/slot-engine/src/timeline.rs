//! Per-shift busy timeline: clip, sentinel-bound and merge busy periods.
//!
//! The timeline always starts with a period touching the shift start and ends
//! with one touching the shift end, so consecutive entries bound every gap of
//! free time, including those at the shift edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A busy interval in absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl Period {
    pub fn new(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        Self { start_at, end_at }
    }

    /// Zero-length marker at `at`.
    fn sentinel(at: DateTime<Utc>) -> Self {
        Self::new(at, at)
    }

    /// True when the period covers real busy time (sentinels do not).
    pub fn is_busy(&self) -> bool {
        self.end_at > self.start_at
    }

    /// Strict overlap: touching endpoints do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_at < end && start < self.end_at
    }
}

/// Free time between two consecutive timeline entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// A busy period (not just the shift edge) ends where the gap starts.
    pub busy_before: bool,
    /// A busy period (not just the shift edge) starts where the gap ends.
    pub busy_after: bool,
}

impl Gap {
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Build the merged busy timeline for one shift.
///
/// Busy periods touching `[shift_start, shift_end]` (endpoints included) are
/// clipped to the shift, bracketed by zero-length sentinels at both edges,
/// sorted, and merged. Overlapping and exactly adjacent periods merge.
/// Periods covering no time, before or after clipping, are ignored.
pub fn build_timeline(
    shift_start: DateTime<Utc>,
    shift_end: DateTime<Utc>,
    busy_periods: &[Period],
) -> Vec<Period> {
    let mut periods: Vec<Period> = busy_periods
        .iter()
        .filter(|p| p.start_at <= shift_end && p.end_at >= shift_start)
        .map(|p| Period::new(p.start_at.max(shift_start), p.end_at.min(shift_end)))
        .filter(Period::is_busy)
        .collect();

    periods.push(Period::sentinel(shift_start));
    periods.push(Period::sentinel(shift_end));

    periods.sort_by_key(|p| (p.start_at, p.end_at));

    let mut merged: Vec<Period> = Vec::with_capacity(periods.len());
    for period in periods {
        if let Some(last) = merged.last_mut() {
            if period.start_at <= last.end_at {
                last.end_at = last.end_at.max(period.end_at);
                continue;
            }
        }
        merged.push(period);
    }

    merged
}

/// Gaps between consecutive timeline entries, in chronological order.
pub fn gaps(timeline: &[Period]) -> Vec<Gap> {
    timeline
        .windows(2)
        .map(|pair| Gap {
            start: pair[0].end_at,
            end: pair[1].start_at,
            busy_before: pair[0].is_busy(),
            busy_after: pair[1].is_busy(),
        })
        .collect()
}
