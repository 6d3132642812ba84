use std::collections::HashMap;

use chrono::TimeZone;

use crate::day_key::{normalize_day_key_in, DayKey};
use crate::types::{Bucket, DailyItem};

/// Overlay a sparse server report onto a zero-filled skeleton.
///
/// Each item overwrites the count of the bucket for its day; when the server
/// repeats a day the last item wins. Items outside the skeleton, or with an
/// unparseable date, are ignored and no bucket is ever added.
pub fn fill_report_gaps<Tz: TimeZone>(skeleton: &[Bucket], items: &[DailyItem], tz: &Tz) -> Vec<Bucket> {
    let mut buckets = skeleton.to_vec();
    let index: HashMap<DayKey, usize> = buckets
        .iter()
        .enumerate()
        .map(|(position, bucket)| (bucket.date_key, position))
        .collect();

    for item in items {
        let Some(day) = normalize_day_key_in(Some(&item.date), tz) else {
            continue;
        };
        if let Some(&position) = index.get(&day) {
            buckets[position].count = item.count;
        }
    }

    buckets
}
