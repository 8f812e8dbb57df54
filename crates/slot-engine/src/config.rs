//! Engine configuration: break rules, slot-start granularity and scoring toggles.
//!
//! Read once per invocation and never mutated. Deserializes from JSON or TOML
//! with camelCase keys; every field has a default.

use std::fmt;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{Result, SlotError};
use crate::wallclock::WallClockTime;

/// Step sizes, in minutes, that a numeric slot-start policy may use.
pub const SUPPORTED_STEPS: [u32; 6] = [5, 10, 15, 20, 30, 60];

/// Finer steps that smart slot starts may add below the primary step.
pub const SMART_STEPS: [u32; 5] = [5, 10, 15, 20, 30];

/// Which instants are legal appointment start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlotStartRepr", into = "SlotStartRepr")]
pub enum SlotStart {
    /// Every instant whose minute-of-hour is a multiple of the step.
    Every(u32),
    /// Same as `Every(60)`.
    EveryHour,
    /// Only the configured custom wall-clock times.
    Custom,
}

impl SlotStart {
    /// Build a numeric policy; the step must be one of [`SUPPORTED_STEPS`].
    pub fn every(step: u32) -> Result<Self> {
        if SUPPORTED_STEPS.contains(&step) {
            Ok(Self::Every(step))
        } else {
            Err(SlotError::InvalidConfig(format!(
                "slotStart must be one of {:?}, \"every-hour\" or \"custom\", got {}",
                SUPPORTED_STEPS, step
            )))
        }
    }

    /// Primary grid step in minutes, or `None` for custom starts.
    pub fn step_minutes(&self) -> Option<u32> {
        match self {
            Self::Every(step) => Some(*step),
            Self::EveryHour => Some(60),
            Self::Custom => None,
        }
    }
}

impl Default for SlotStart {
    fn default() -> Self {
        Self::Every(15)
    }
}

impl fmt::Display for SlotStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Every(step) => write!(f, "{}", step),
            Self::EveryHour => f.write_str("every-hour"),
            Self::Custom => f.write_str("custom"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SlotStartRepr {
    Step(u32),
    Named(String),
}

impl TryFrom<SlotStartRepr> for SlotStart {
    type Error = SlotError;

    fn try_from(repr: SlotStartRepr) -> Result<Self> {
        match repr {
            SlotStartRepr::Step(step) => Self::every(step),
            SlotStartRepr::Named(name) => match name.as_str() {
                "every-hour" => Ok(Self::EveryHour),
                "custom" => Ok(Self::Custom),
                other => other
                    .parse::<u32>()
                    .map_err(|_| {
                        SlotError::InvalidConfig(format!("unknown slotStart '{}'", other))
                    })
                    .and_then(Self::every),
            },
        }
    }
}

impl From<SlotStart> for SlotStartRepr {
    fn from(policy: SlotStart) -> Self {
        match policy {
            SlotStart::Every(step) => Self::Step(step),
            other => Self::Named(other.to_string()),
        }
    }
}

/// Immutable per-invocation engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfiguration {
    /// Minimum free minutes required next to a busy period.
    pub break_duration: u32,
    /// Turn break violations into a priority penalty instead of a hard filter.
    pub allow_skip_break: bool,
    pub slot_start: SlotStart,
    /// Used only when `slot_start` is [`SlotStart::Custom`].
    pub custom_slots: Vec<WallClockTime>,
    /// Offer finer-grained starts alongside the primary grid.
    pub allow_smart_slot_starts: bool,
    /// Keep only the best-packing, highest-priority slots of each gap.
    pub filter_low_priority_slots: bool,
    pub lower_priority_if_no_following_booking: bool,
    pub discourage_large_gaps: bool,
    pub prefer_back_to_back: bool,
    /// IANA zone used for calendar dates and wall-clock times.
    pub time_zone: String,
    pub dst_policy: DstPolicy,
}

impl Default for EngineConfiguration {
    fn default() -> Self {
        Self {
            break_duration: 0,
            allow_skip_break: false,
            slot_start: SlotStart::default(),
            custom_slots: Vec::new(),
            allow_smart_slot_starts: false,
            filter_low_priority_slots: false,
            lower_priority_if_no_following_booking: false,
            discourage_large_gaps: false,
            prefer_back_to_back: false,
            time_zone: "UTC".to_string(),
            dst_policy: DstPolicy::default(),
        }
    }
}

impl EngineConfiguration {
    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SlotError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that the types alone cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.slot_start == SlotStart::Custom && self.custom_slots.is_empty() {
            return Err(SlotError::InvalidConfig(
                "slotStart \"custom\" requires at least one customSlots entry".to_string(),
            ));
        }
        if let SlotStart::Every(step) = self.slot_start {
            SlotStart::every(step)?;
        }
        self.tz()?;
        Ok(())
    }

    /// The configured zone, parsed.
    pub fn tz(&self) -> Result<Tz> {
        self.time_zone
            .parse()
            .map_err(|_| SlotError::InvalidTimezone(self.time_zone.clone()))
    }

    /// Copy of this configuration with smart slot starts disabled.
    pub fn without_smart_starts(&self) -> Self {
        Self {
            allow_smart_slot_starts: false,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: EngineConfiguration = serde_json::from_str(r#"{"breakDuration":10}"#).unwrap();
        assert_eq!(config.break_duration, 10);
        assert_eq!(config.slot_start, SlotStart::Every(15));
        assert_eq!(config.time_zone, "UTC");
    }

    #[test]
    fn slot_start_accepts_numbers_and_names() {
        let parse = |s: &str| serde_json::from_str::<SlotStart>(s);
        assert_eq!(parse("30").unwrap(), SlotStart::Every(30));
        assert_eq!(parse(r#""every-hour""#).unwrap(), SlotStart::EveryHour);
        assert_eq!(parse(r#""custom""#).unwrap(), SlotStart::Custom);
        assert_eq!(parse(r#""20""#).unwrap(), SlotStart::Every(20));
        assert!(parse("7").is_err());
        assert!(parse(r#""hourly""#).is_err());
    }

    #[test]
    fn slot_start_serializes_back_to_source_form() {
        assert_eq!(serde_json::to_string(&SlotStart::Every(10)).unwrap(), "10");
        assert_eq!(
            serde_json::to_string(&SlotStart::EveryHour).unwrap(),
            r#""every-hour""#
        );
    }

    #[test]
    fn custom_without_slots_is_rejected() {
        let config = EngineConfiguration {
            slot_start: SlotStart::Custom,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SlotError::InvalidConfig(_))));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let config = EngineConfiguration {
            time_zone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SlotError::InvalidTimezone(_))));
    }

    #[test]
    fn loads_from_toml() {
        let config = EngineConfiguration::from_toml_str(
            r#"
            breakDuration = 15
            slotStart = "custom"
            customSlots = ["09:00", { hour = 14, minute = 30 }]
            timeZone = "Europe/Berlin"
            dstPolicy = "skip"
            "#,
        )
        .unwrap();
        assert_eq!(config.break_duration, 15);
        assert_eq!(config.custom_slots.len(), 2);
        assert_eq!(config.dst_policy, DstPolicy::Skip);
    }
}
