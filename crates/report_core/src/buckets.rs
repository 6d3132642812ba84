use crate::range::TimeWindow;
use crate::types::Bucket;

/// Zero-count skeleton with one bucket per calendar day of `window`.
///
/// Walks calendar dates rather than adding 24-hour periods, so a DST shift
/// inside the window can neither skip nor repeat a day. An inverted window
/// produces an empty skeleton.
pub fn generate_buckets(window: &TimeWindow) -> Vec<Bucket> {
    if window.is_empty() {
        return Vec::new();
    }

    let last = window.end_day();
    let capacity = usize::try_from(window.day_count()).unwrap_or(0);
    let mut buckets = Vec::with_capacity(capacity);
    let mut day = Some(window.start_day());

    while let Some(current) = day.filter(|current| *current <= last) {
        buckets.push(Bucket::empty(current));
        day = current.next();
    }

    buckets
}
