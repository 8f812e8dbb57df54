//! Wall-clock times, shifts and per-date schedules.
//!
//! Shift boundaries are parsed from `"HH:MM"` strings into [`WallClockTime`]
//! and compared numerically, so `"9:00"` and `"09:00"` mean the same thing.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// A time of day with minute precision. Ordered within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "WallClockRepr", into = "String")]
pub struct WallClockTime {
    hour: u32,
    minute: u32,
}

impl WallClockTime {
    /// Build a wall-clock time, rejecting hours above 23 and minutes above 59.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(SlotError::InvalidWallClock(format!(
                "{}:{:02} is out of range",
                hour, minute
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_from_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn to_naive_time(self) -> NaiveTime {
        // Range is checked in `new`, so this cannot fail.
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }
}

impl FromStr for WallClockTime {
    type Err = SlotError;

    /// Parse `"H:MM"` or `"HH:MM"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SlotError::InvalidWallClock(format!("expected HH:MM, got '{}'", s));

        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for WallClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl From<WallClockTime> for String {
    fn from(t: WallClockTime) -> Self {
        t.to_string()
    }
}

/// Accepted serialized forms: `"14:30"` or `{"hour": 14, "minute": 30}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum WallClockRepr {
    Text(String),
    Parts { hour: u32, minute: u32 },
}

impl TryFrom<WallClockRepr> for WallClockTime {
    type Error = SlotError;

    fn try_from(repr: WallClockRepr) -> Result<Self> {
        match repr {
            WallClockRepr::Text(s) => s.parse(),
            WallClockRepr::Parts { hour, minute } => Self::new(hour, minute),
        }
    }
}

/// One contiguous bookable interval on a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ShiftRepr")]
pub struct Shift {
    pub start: WallClockTime,
    pub end: WallClockTime,
}

impl Shift {
    /// Build a shift; `end` must be strictly after `start`.
    pub fn new(start: WallClockTime, end: WallClockTime) -> Result<Self> {
        if end <= start {
            return Err(SlotError::InvalidShift(format!(
                "shift end {} is not after start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a shift from two `"HH:MM"` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(start.parse()?, end.parse()?)
    }
}

#[derive(Deserialize)]
struct ShiftRepr {
    start: WallClockTime,
    end: WallClockTime,
}

impl TryFrom<ShiftRepr> for Shift {
    type Error = SlotError;

    fn try_from(repr: ShiftRepr) -> Result<Self> {
        Self::new(repr.start, repr.end)
    }
}

/// Shifts keyed by calendar date. A missing date means closed that day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaySchedule {
    days: BTreeMap<NaiveDate, Vec<Shift>>,
}

impl DaySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shift to `date`, keeping declaration order.
    pub fn add_shift(&mut self, date: NaiveDate, shift: Shift) {
        self.days.entry(date).or_default().push(shift);
    }

    /// Shifts on `date` in declaration order; empty when closed.
    pub fn shifts_on(&self, date: NaiveDate) -> &[Shift] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop every shift on `date`.
    pub fn close(&mut self, date: NaiveDate) {
        self.days.remove(&date);
    }

    /// Merge another schedule into this one; shifts are appended per date.
    pub fn extend(&mut self, other: DaySchedule) {
        for (date, shifts) in other.days {
            self.days.entry(date).or_default().extend(shifts);
        }
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }
}
