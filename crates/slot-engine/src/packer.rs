//! Greedy packing estimate: how many more appointments fit into free time.
//!
//! This is a scoring signal, not a booking guarantee. Greedy largest-first is
//! not optimal for arbitrary duration sets.

use crate::config::EngineConfiguration;

/// Outcome of packing one span of free minutes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Packing {
    /// Appointments that fit.
    pub count: u32,
    /// Sum of the rank weights of the packed durations (1 = longest).
    pub total_weight: u32,
}

impl std::ops::Add for Packing {
    type Output = Packing;

    fn add(self, other: Packing) -> Packing {
        Packing {
            count: self.count + other.count,
            total_weight: self.total_weight + other.total_weight,
        }
    }
}

/// Request-scoped packer over the catalog of service durations.
///
/// Durations are de-duplicated and sorted longest first; a duration's weight
/// is its 1-based rank in that list.
#[derive(Debug, Clone)]
pub struct GapPacker {
    durations: Vec<u32>,
    break_duration: u32,
    allow_skip_break: bool,
}

impl GapPacker {
    /// Zero durations are ignored; they would never consume any time.
    pub fn new(service_durations: &[u32], config: &EngineConfiguration) -> Self {
        let mut durations: Vec<u32> = service_durations.iter().copied().filter(|d| *d > 0).collect();
        durations.sort_unstable_by(|a, b| b.cmp(a));
        durations.dedup();
        Self {
            durations,
            break_duration: config.break_duration,
            allow_skip_break: config.allow_skip_break,
        }
    }

    /// Catalog durations, longest first.
    pub fn durations(&self) -> &[u32] {
        &self.durations
    }

    /// Rank weight of `duration`, or `None` if it is not in the catalog.
    pub fn weight(&self, duration: u32) -> Option<u32> {
        self.durations
            .iter()
            .position(|d| *d == duration)
            .map(|rank| rank as u32 + 1)
    }

    /// True if any catalog duration fits within `minutes`.
    pub fn any_fits(&self, minutes: i64) -> bool {
        self.durations.iter().any(|d| i64::from(*d) <= minutes)
    }

    /// Greedily pack `available_minutes`, always taking the longest duration
    /// that still fits (with its trailing break unless breaks may be skipped).
    pub fn fit(&self, available_minutes: i64) -> Packing {
        let mut remaining = available_minutes;
        let mut packing = Packing::default();

        loop {
            let next = self
                .durations
                .iter()
                .enumerate()
                .map(|(rank, d)| (rank, i64::from(*d)))
                .find(|(_, d)| self.cost(*d) <= remaining);

            let Some((rank, duration)) = next else {
                break;
            };
            packing.count += 1;
            packing.total_weight += rank as u32 + 1;
            remaining -= self.cost(duration);
        }

        packing
    }

    fn cost(&self, duration: i64) -> i64 {
        if self.allow_skip_break {
            duration
        } else {
            duration + i64::from(self.break_duration)
        }
    }
}
