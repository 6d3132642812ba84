//! report_core - Day-bucketed aggregation for the repair console reports
//!
//! Everything in this crate is synchronous and free of I/O: raw API payloads
//! and a time window go in, ordered day buckets and totals come out.

pub mod aggregate;
pub mod buckets;
pub mod call_logs;
pub mod dashboard;
pub mod day_key;
pub mod envelope;
pub mod gap_fill;
pub mod range;
pub mod summary;
pub mod types;

pub use aggregate::{aggregate_series, aggregate_series_by};
pub use buckets::generate_buckets;
pub use call_logs::{call_log_series, CallLogSeries};
pub use dashboard::{build_dashboard, DashboardReport, DashboardSources, OrderStage, OrderStatus};
pub use day_key::{normalize_day_key, normalize_day_key_in, DayKey};
pub use envelope::{extract_records, into_records, EnvelopeKeys};
pub use gap_fill::fill_report_gaps;
pub use range::{RangePreset, RangePresetParseError, TimeWindow};
pub use summary::{breakdown, total_count, Category, CategoryTotal};
pub use types::{AggregatedSeries, Bucket, DailyItem, DailyReport};
