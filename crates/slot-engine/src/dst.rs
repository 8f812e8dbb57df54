//! DST handling for wall-clock times that must become absolute instants.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for wall-clock times that fall inside a DST gap (spring forward).
///
/// Ambiguous times (fall back) always resolve to the earlier instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DstPolicy {
    /// Drop times that do not exist on that date.
    Skip,
    /// Move to the first valid local time after the gap.
    #[default]
    ShiftForward,
}

/// Longest DST gap we search across when shifting forward.
const MAX_GAP_MINUTES: i64 = 120;

/// Resolve a local date-time in `tz` to a UTC instant under `policy`.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    if let Some(dt) = tz.from_local_datetime(&local).earliest() {
        return Some(dt.with_timezone(&Utc));
    }
    match policy {
        DstPolicy::Skip => None,
        DstPolicy::ShiftForward => (1..=MAX_GAP_MINUTES).find_map(|m| {
            tz.from_local_datetime(&(local + Duration::minutes(m)))
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn ordinary_time_resolves_directly() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let got = resolve_local(&tz, local(2026, 1, 5, 9, 0), DstPolicy::Skip).unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2026, 1, 5, 14, 0, 0).unwrap());
    }

    #[test]
    fn gap_time_is_skipped_or_shifted() {
        // 2026-03-08 02:30 does not exist in New York.
        let tz: Tz = "America/New_York".parse().unwrap();
        let gap = local(2026, 3, 8, 2, 30);
        assert_eq!(resolve_local(&tz, gap, DstPolicy::Skip), None);
        assert_eq!(
            resolve_local(&tz, gap, DstPolicy::ShiftForward),
            Some(Utc.with_ymd_and_hms(2026, 3, 8, 7, 0, 0).unwrap())
        );
    }

    #[test]
    fn ambiguous_time_takes_earliest() {
        // 2026-11-01 01:30 happens twice in New York; EDT comes first.
        let tz: Tz = "America/New_York".parse().unwrap();
        let got = resolve_local(&tz, local(2026, 11, 1, 1, 30), DstPolicy::Skip).unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap());
    }
}
