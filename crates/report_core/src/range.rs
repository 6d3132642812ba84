//! Named range presets and the windows they resolve to.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::day_key::DayKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangePreset {
    #[default]
    #[serde(rename = "7d")]
    LastSevenDays,
    #[serde(rename = "30d")]
    LastThirtyDays,
    #[serde(rename = "3m")]
    LastThreeMonths,
    #[serde(rename = "1y")]
    LastYear,
    #[serde(rename = "all")]
    All,
}

impl RangePreset {
    /// Every preset, in the order they are offered to the user.
    pub const ALL: [RangePreset; 5] = [
        RangePreset::LastSevenDays,
        RangePreset::LastThirtyDays,
        RangePreset::LastThreeMonths,
        RangePreset::LastYear,
        RangePreset::All,
    ];

    /// Wire identifier, also used as the `range` query parameter.
    pub fn id(self) -> &'static str {
        match self {
            Self::LastSevenDays => "7d",
            Self::LastThirtyDays => "30d",
            Self::LastThreeMonths => "3m",
            Self::LastYear => "1y",
            Self::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LastSevenDays => "Last 7 days",
            Self::LastThirtyDays => "Last 30 days",
            Self::LastThreeMonths => "Last 3 months",
            Self::LastYear => "Last year",
            Self::All => "All time",
        }
    }

    /// Window start for a window ending at `now`.
    ///
    /// The day counts are inclusive of today: "last 7 days" starts six days
    /// back. Month arithmetic clamps to the end of shorter months.
    pub fn start(self, now: NaiveDateTime) -> NaiveDateTime {
        let start = match self {
            Self::LastSevenDays => now.checked_sub_signed(Duration::days(6)),
            Self::LastThirtyDays => now.checked_sub_signed(Duration::days(29)),
            Self::LastThreeMonths => now.checked_sub_months(Months::new(3)),
            Self::LastYear => now.checked_sub_months(Months::new(12)),
            // 1970-01-01T00:00:00
            Self::All => Some(NaiveDateTime::default()),
        };
        start.unwrap_or(NaiveDateTime::MIN)
    }

    pub fn resolve(self, now: NaiveDateTime) -> TimeWindow {
        TimeWindow::new(self.start(now), now)
    }
}

impl fmt::Display for RangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown range preset `{0}` (expected one of 7d, 30d, 3m, 1y, all)")]
pub struct RangePresetParseError(pub String);

impl FromStr for RangePreset {
    type Err = RangePresetParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|preset| preset.id().eq_ignore_ascii_case(value))
            .ok_or_else(|| RangePresetParseError(value.to_string()))
    }
}

/// A concrete `[start, end]` range in local wall-clock time.
///
/// Bucketing treats both ends as whole days: every calendar day from
/// `start`'s day through `end`'s day is covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn start_day(&self) -> DayKey {
        DayKey::new(self.start.date())
    }

    pub fn end_day(&self) -> DayKey {
        DayKey::new(self.end.date())
    }

    /// True when the window covers no calendar day at all.
    pub fn is_empty(&self) -> bool {
        self.start_day() > self.end_day()
    }

    pub fn contains_day(&self, day: DayKey) -> bool {
        self.start_day() <= day && day <= self.end_day()
    }

    /// Number of calendar days covered, zero for an empty window.
    pub fn day_count(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let span = self.end.date().signed_duration_since(self.start.date());
        span.num_days().unsigned_abs() + 1
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, 15, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn day_presets_include_today() {
        let now = at(2024, 1, 10, 9);
        let window = RangePreset::LastSevenDays.resolve(now);
        assert_eq!(window.start, at(2024, 1, 4, 9));
        assert_eq!(window.end, now);
        assert_eq!(window.day_count(), 7);

        let window = RangePreset::LastThirtyDays.resolve(now);
        assert_eq!(window.start_day().to_string(), "2023-12-12");
        assert_eq!(window.day_count(), 30);
    }

    #[test]
    fn month_presets_use_calendar_arithmetic() {
        let now = at(2024, 5, 31, 12);
        assert_eq!(
            RangePreset::LastThreeMonths.start(now).date().to_string(),
            "2024-02-29"
        );

        let leap_day = at(2024, 2, 29, 12);
        assert_eq!(
            RangePreset::LastYear.start(leap_day).date().to_string(),
            "2023-02-28"
        );
    }

    #[test]
    fn all_starts_at_the_epoch() {
        let window = RangePreset::All.resolve(at(2024, 1, 10, 9));
        assert_eq!(window.start_day().to_string(), "1970-01-01");
        assert!(window.start <= window.end);
    }

    #[test]
    fn every_preset_ends_now_and_starts_before_it() {
        let now = at(2024, 3, 1, 0);
        for preset in RangePreset::ALL {
            let window = preset.resolve(now);
            assert_eq!(window.end, now, "preset {preset}");
            assert!(window.start <= window.end, "preset {preset}");
        }
    }

    #[test]
    fn parses_ids_and_rejects_unknown_ones() {
        for preset in RangePreset::ALL {
            assert_eq!(preset.id().parse::<RangePreset>(), Ok(preset));
        }
        assert_eq!(" 30D ".parse::<RangePreset>(), Ok(RangePreset::LastThirtyDays));
        assert_eq!(
            "2w".parse::<RangePreset>(),
            Err(RangePresetParseError("2w".to_string()))
        );
    }

    #[test]
    fn default_preset_is_the_last_seven_days() {
        assert_eq!(RangePreset::default(), RangePreset::LastSevenDays);
        assert_eq!(RangePreset::default().id(), "7d");
    }

    #[test]
    fn inverted_window_is_empty() {
        let window = TimeWindow::new(at(2024, 1, 5, 0), at(2024, 1, 4, 23));
        assert!(window.is_empty());
        assert_eq!(window.day_count(), 0);

        let same_day = TimeWindow::new(at(2024, 1, 4, 20), at(2024, 1, 4, 1));
        assert!(!same_day.is_empty());
        assert_eq!(same_day.day_count(), 1);
    }
}
