use serde::{Deserialize, Serialize};

use crate::day_key::DayKey;

/// A single calendar day's count within a window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub date_key: DayKey,
    pub display_label: String,
    pub count: u64,
}

impl Bucket {
    /// Zero-count bucket for `day`, labelled `MM/DD`.
    pub fn empty(day: DayKey) -> Self {
        Self {
            display_label: day.display_label(),
            date_key: day,
            count: 0,
        }
    }
}

/// One entry of the server's pre-aggregated daily report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyItem {
    pub date: String,
    #[serde(default)]
    pub count: u64,
}

/// Daily call-log report as served by
/// `GET /admin/call-logs/reports/daily`.
///
/// Sparse: days without activity may be missing from `items`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyReport {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub items: Vec<DailyItem>,
}

/// Ordered day buckets for one (source, window) pair plus their total.
///
/// Built once per selection and never modified afterwards; a new selection
/// produces a new series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregatedSeries {
    pub buckets: Vec<Bucket>,
    pub total: u64,
}

impl AggregatedSeries {
    pub fn from_buckets(buckets: Vec<Bucket>) -> Self {
        let total = crate::summary::total_count(&buckets);
        Self { buckets, total }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Count for `day`, if the day is part of the series.
    pub fn count_on(&self, day: DayKey) -> Option<u64> {
        self.buckets
            .binary_search_by(|bucket| bucket.date_key.cmp(&day))
            .ok()
            .map(|index| self.buckets[index].count)
    }
}
