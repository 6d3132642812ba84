use std::collections::HashMap;

use chrono::TimeZone;
use serde_json::Value;

use crate::day_key::{normalize_day_key_in, DayKey};
use crate::types::Bucket;

/// Count `records` into a copy of `skeleton`, keyed on the string field
/// `field` of each record.
pub fn aggregate_series<'r, I, Tz>(skeleton: &[Bucket], records: I, field: &str, tz: &Tz) -> Vec<Bucket>
where
    I: IntoIterator<Item = &'r Value>,
    Tz: TimeZone,
{
    aggregate_series_by(skeleton, records, tz, |record| {
        record.get(field).and_then(Value::as_str)
    })
}

/// Count `records` into a copy of `skeleton`, reading each record's
/// timestamp through `date_of`.
///
/// Records whose timestamp is missing, unparseable or outside the skeleton
/// are skipped. The skeleton itself is never modified.
pub fn aggregate_series_by<'r, I, Tz, F>(
    skeleton: &[Bucket],
    records: I,
    tz: &Tz,
    date_of: F,
) -> Vec<Bucket>
where
    I: IntoIterator<Item = &'r Value>,
    Tz: TimeZone,
    F: Fn(&'r Value) -> Option<&'r str>,
{
    let mut buckets = skeleton.to_vec();
    let index: HashMap<DayKey, usize> = buckets
        .iter()
        .enumerate()
        .map(|(position, bucket)| (bucket.date_key, position))
        .collect();

    for record in records {
        let Some(day) = normalize_day_key_in(date_of(record), tz) else {
            continue;
        };
        if let Some(&position) = index.get(&day) {
            buckets[position].count += 1;
        }
    }

    buckets
}
