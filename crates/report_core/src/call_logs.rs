use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::buckets::generate_buckets;
use crate::gap_fill::fill_report_gaps;
use crate::range::TimeWindow;
use crate::types::{AggregatedSeries, DailyReport};

/// The call-log chart: the server report laid over the local window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallLogSeries {
    pub window: TimeWindow,
    pub series: AggregatedSeries,
    /// Range the server says it reported on, shown as-is.
    pub reported_from: String,
    pub reported_to: String,
}

impl CallLogSeries {
    /// The server's own range label, when it sent both ends.
    pub fn reported_range(&self) -> Option<(&str, &str)> {
        if self.reported_from.is_empty() || self.reported_to.is_empty() {
            None
        } else {
            Some((&self.reported_from, &self.reported_to))
        }
    }
}

/// The window total is recomputed from the filled buckets; the report's own
/// `total` may cover days outside the local window.
pub fn call_log_series<Tz: TimeZone>(report: &DailyReport, window: &TimeWindow, tz: &Tz) -> CallLogSeries {
    let skeleton = generate_buckets(window);
    CallLogSeries {
        window: *window,
        series: AggregatedSeries::from_buckets(fill_report_gaps(&skeleton, &report.items, tz)),
        reported_from: report.from.clone(),
        reported_to: report.to.clone(),
    }
}
