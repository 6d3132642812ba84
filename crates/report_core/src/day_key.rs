//! Calendar-day keys
//!
//! Records carry timestamps in whatever shape the API produced. Bucketing
//! only cares about the local calendar day, so every timestamp is reduced to
//! a [`DayKey`] or rejected as unparseable (`None`).

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

const DAY_FORMAT: &str = "%Y-%m-%d";
const DATE_LEN: usize = "YYYY-MM-DD".len();
const LABEL_FORMAT: &str = "%m/%d";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// A local calendar day.
///
/// Displays as zero-padded `YYYY-MM-DD`, so string order and chronological
/// order agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// The following calendar day, `None` at the end of chrono's range.
    pub fn next(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Short chart label, `MM/DD`.
    pub fn display_label(self) -> String {
        self.0.format(LABEL_FORMAT).to_string()
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

/// [`normalize_day_key_in`] using the machine's local timezone.
pub fn normalize_day_key(raw: Option<&str>) -> Option<DayKey> {
    normalize_day_key_in(raw, &Local)
}

/// Reduce a timestamp-ish string to the calendar day it falls on in `tz`.
///
/// Timestamps with an offset (`Z`, `+03:30`, `+0330`, `+03`) are converted into
/// `tz` first. Timestamps without one, and bare `YYYY-MM-DD` dates, are read
/// as wall-clock values already in `tz`. Anything else, including a missing
/// or blank value, is unparseable and yields `None`.
pub fn normalize_day_key_in<Tz: TimeZone>(raw: Option<&str>, tz: &Tz) -> Option<DayKey> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let expanded = expand_short_time(raw);
    let raw = expanded.as_deref().unwrap_or(raw);

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(DayKey(instant.with_timezone(tz).date_naive()));
    }
    for format in OFFSET_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(raw, format) {
            return Some(DayKey(instant.with_timezone(tz).date_naive()));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(DayKey(naive.date()));
        }
    }

    NaiveDate::parse_from_str(raw, DAY_FORMAT).ok().map(DayKey)
}

/// Pads the two shapes chrono will not read on its own: an hour-only time
/// (`2024-01-10T22`) gets `:00` minutes and an hour-only offset
/// (`2024-01-10T22:00:00+03`) gets `:00` offset minutes.
fn expand_short_time(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let is_digit = |index: usize| bytes.get(index).map_or(false, u8::is_ascii_digit);
    let has_time_separator = matches!(bytes.get(DATE_LEN), Some(b'T' | b' '));

    if bytes.len() == DATE_LEN + 3
        && has_time_separator
        && is_digit(DATE_LEN + 1)
        && is_digit(DATE_LEN + 2)
    {
        return Some(format!("{raw}:00"));
    }

    // Offset sign, two digits, and a full HH:MM:SS time before it.
    let sign = bytes.len().checked_sub(3)?;
    if sign >= DATE_LEN + 9
        && has_time_separator
        && matches!(bytes[sign], b'+' | b'-')
        && is_digit(sign - 1)
        && is_digit(sign + 1)
        && is_digit(sign + 2)
    {
        return Some(format!("{raw}:00"));
    }

    None
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    fn day(year: i32, month: u32, d: u32) -> DayKey {
        DayKey::from_ymd(year, month, d).expect("valid date")
    }

    #[test]
    fn date_only_input_maps_to_the_same_day() {
        assert_eq!(
            normalize_day_key_in(Some("2024-01-10"), &Utc),
            Some(day(2024, 1, 10))
        );
    }

    #[test]
    fn offset_timestamps_are_shifted_into_the_target_zone() {
        let tehran = FixedOffset::east_opt(3 * 3600 + 1800).expect("valid offset");
        assert_eq!(
            normalize_day_key_in(Some("2024-01-10T22:00:00.000Z"), &tehran),
            Some(day(2024, 1, 11))
        );
        assert_eq!(
            normalize_day_key_in(Some("2024-01-10T22:00:00Z"), &Utc),
            Some(day(2024, 1, 10))
        );
        assert_eq!(
            normalize_day_key_in(Some("2024-01-11T01:00:00+0330"), &Utc),
            Some(day(2024, 1, 10))
        );
    }

    #[test]
    fn hour_only_offsets_are_accepted() {
        for raw in [
            "2024-01-10T22:00:00+03",
            "2024-01-10 22:00:00+03",
            "2024-01-10T22:00:00.500+03",
        ] {
            assert_eq!(
                normalize_day_key_in(Some(raw), &Utc),
                Some(day(2024, 1, 10)),
                "input {raw:?}"
            );
        }
        assert_eq!(
            normalize_day_key_in(Some("2024-01-10T01:00:00+03"), &Utc),
            Some(day(2024, 1, 9))
        );
        assert_eq!(
            normalize_day_key_in(Some("2024-01-10T22:00:00-05"), &Utc),
            Some(day(2024, 1, 11))
        );
    }

    #[test]
    fn naive_timestamps_keep_their_wall_clock_day() {
        let tehran = FixedOffset::east_opt(3 * 3600 + 1800).expect("valid offset");
        for raw in [
            "2024-01-10T23:30:00",
            "2024-01-10T23:30:00.250",
            "2024-01-10 23:30:00",
            "2024-01-10T23:30",
            "2024-01-10T23",
            "2024-01-10 23",
        ] {
            assert_eq!(
                normalize_day_key_in(Some(raw), &tehran),
                Some(day(2024, 1, 10)),
                "input {raw:?}"
            );
        }
    }

    #[test]
    fn garbage_and_missing_values_are_unparseable() {
        for raw in [
            "",
            "   ",
            "yesterday",
            "2024-02-30",
            "2024-01-10T25:00:00",
            "10/01/2024",
            "2024-01-10T2",
            "2024-01-10T25",
            "2024-01-10X22",
            "2024-01-10T22:00:00+3",
            "2024-01-10T22:00:00+99",
            "2024-01-10T22:00:00+03:0",
        ] {
            assert_eq!(normalize_day_key_in(Some(raw), &Utc), None, "input {raw:?}");
        }
        assert_eq!(normalize_day_key_in(None, &Utc), None);
    }

    #[test]
    fn keys_sort_lexically_and_chronologically_alike() {
        let keys = [day(2023, 12, 31), day(2024, 1, 2), day(2024, 10, 1)];
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        let mut sorted = rendered.clone();
        sorted.sort();
        assert_eq!(rendered, sorted);
        assert_eq!(rendered[1], "2024-01-02");
        assert_eq!(keys[1].display_label(), "01/02");
    }
}
