//! Top-line totals and per-category breakdowns.

use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::aggregate_series;
use crate::buckets::generate_buckets;
use crate::range::TimeWindow;
use crate::types::{AggregatedSeries, Bucket};

/// Sum of all bucket counts.
pub fn total_count(buckets: &[Bucket]) -> u64 {
    buckets.iter().map(|bucket| bucket.count).sum()
}

/// A named slice of the records, counted on its own date field.
#[derive(Debug, Clone, Copy)]
pub struct Category<'a> {
    pub name: &'a str,
    pub date_field: &'a str,
    pub predicate: fn(&Value) -> bool,
}

impl<'a> Category<'a> {
    /// Day-bucketed series of the records matching this category.
    pub fn series<Tz: TimeZone>(&self, records: &[Value], window: &TimeWindow, tz: &Tz) -> AggregatedSeries {
        let skeleton = generate_buckets(window);
        let matching = records.iter().filter(|record| (self.predicate)(*record));
        AggregatedSeries::from_buckets(aggregate_series(&skeleton, matching, self.date_field, tz))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub total: u64,
    /// Fraction of the combined total of all categories, 0.0 when that is 0.
    pub share: f64,
}

/// Window totals per category together with each category's share.
pub fn breakdown<Tz: TimeZone>(
    records: &[Value],
    window: &TimeWindow,
    categories: &[Category<'_>],
    tz: &Tz,
) -> Vec<CategoryTotal> {
    let totals: Vec<(&str, u64)> = categories
        .iter()
        .map(|category| (category.name, category.series(records, window, tz).total))
        .collect();
    let combined: u64 = totals.iter().map(|(_, total)| total).sum();

    totals
        .into_iter()
        .map(|(name, total)| CategoryTotal {
            name: name.to_string(),
            total,
            share: if combined == 0 {
                0.0
            } else {
                total as f64 / combined as f64
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    use super::*;

    fn is_completed(record: &Value) -> bool {
        record.get("orderStage").and_then(Value::as_str) == Some("COMPLETED")
    }

    fn is_not_repairable(record: &Value) -> bool {
        record.get("status").and_then(Value::as_str) == Some("NOT_REPAIRABLE")
    }

    const CATEGORIES: [Category<'static>; 2] = [
        Category {
            name: "completed",
            date_field: "updatedAt",
            predicate: is_completed,
        },
        Category {
            name: "not_repairable",
            date_field: "updatedAt",
            predicate: is_not_repairable,
        },
    ];

    fn window() -> TimeWindow {
        let at = |day: u32| {
            NaiveDate::from_ymd_opt(2024, 1, day)
                .and_then(|date| date.and_hms_opt(10, 0, 0))
                .expect("valid timestamp")
        };
        TimeWindow::new(at(4), at(10))
    }

    #[test]
    fn splits_records_into_category_totals_and_shares() {
        let records = vec![
            json!({"orderStage": "COMPLETED", "updatedAt": "2024-01-05"}),
            json!({"orderStage": "COMPLETED", "updatedAt": "2024-01-09"}),
            json!({"orderStage": "COMPLETED", "updatedAt": "2024-01-09"}),
            json!({"orderStage": "COMPLETED", "updatedAt": "2023-11-01"}),
            json!({"status": "NOT_REPAIRABLE", "updatedAt": "2024-01-10"}),
            json!({"orderStage": "IN_REPAIR", "updatedAt": "2024-01-10"}),
        ];

        let totals = breakdown(&records, &window(), &CATEGORIES, &Utc);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].name, "completed");
        assert_eq!(totals[0].total, 3);
        assert_eq!(totals[1].total, 1);
        assert!((totals[0].share - 0.75).abs() < f64::EPSILON);
        assert!((totals[1].share - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn shares_are_zero_without_matches() {
        let totals = breakdown(&[], &window(), &CATEGORIES, &Utc);
        assert!(totals.iter().all(|total| total.total == 0 && total.share == 0.0));
    }

    #[test]
    fn total_of_empty_series_is_zero() {
        assert_eq!(total_count(&[]), 0);
    }
}
