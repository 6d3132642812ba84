//! Terminal rendering of the reports.

use chrono::NaiveDateTime;
use colored::Colorize;
use report_core::{
    AggregatedSeries, Bucket, CallLogSeries, DashboardReport, RangePreset, TimeWindow,
};
use report_state::{Notice, NoticeLevel};

const BAR_WIDTH: usize = 40;

pub fn presets(now: NaiveDateTime) {
    println!("{}", "Range presets".bold());
    for preset in RangePreset::ALL {
        let window = preset.resolve(now);
        println!(
            "  {:<4} {:<14} {}",
            preset.id().cyan(),
            preset.label(),
            window_label(&window).dimmed()
        );
    }
}

pub fn dashboard(report: &DashboardReport) {
    println!(
        "{} {}",
        "Dashboard".bold(),
        window_label(&report.window).dimmed()
    );

    let today = &report.today;
    println!("\n{}", "Today".bold());
    tile("Users registered", today.users_registered_today);
    tile("Orders registered", today.orders_registered_today);
    tile("Completed", today.orders_completed_today);
    tile("Not repairable", today.orders_not_repairable_today);

    println!("\n{}", "Open orders".bold());
    tile("Price set", today.orders_price_set);
    tile("Technician assigned", today.orders_technician_assigned);
    tile("In repair", today.orders_in_repair);
    tile("Ready for pickup", today.orders_ready_for_pickup);

    series("Registered orders", &report.registered_orders);
    series("Completed orders", &report.completed_orders);
    series("Not repairable orders", &report.not_repairable_orders);
    series("Registered users", &report.registered_users);

    println!("\n{}", "Outcomes".bold());
    for category in &report.outcome_breakdown {
        println!(
            "  {:<22} {:>6}  {:>5.1}%",
            category.name,
            category.total,
            category.share * 100.0
        );
    }

    println!("\n{}", "Catalog".bold());
    tile("Brands", report.catalog.brands);
    tile("Models", report.catalog.models);
    tile("Problems", report.catalog.problems);
}

pub fn call_logs(report: &CallLogSeries, service_id: u64) {
    println!(
        "{} {} {}",
        "Call logs".bold(),
        format!("service {service_id}").cyan(),
        window_label(&report.window).dimmed()
    );
    if let Some((from, to)) = report.reported_range() {
        println!("{}", format!("server range {from} .. {to}").dimmed());
    }
    series("Calls per day", &report.series);
}

pub fn notice(notice: &Notice) {
    let message = match notice.level {
        NoticeLevel::Info => notice.message.normal(),
        NoticeLevel::Warning => notice.message.yellow(),
        NoticeLevel::Error => notice.message.red(),
    };
    eprintln!("{message}");
}

fn tile(label: &str, value: u64) {
    println!("  {:<22} {:>6}", label, value.to_string().green());
}

fn series(title: &str, series: &AggregatedSeries) {
    println!(
        "\n{} {}",
        title.bold(),
        format!("total {}", series.total).green()
    );
    let max = series
        .buckets
        .iter()
        .map(|bucket| bucket.count)
        .max()
        .unwrap_or(0);
    for row in rows(&series.buckets) {
        match row {
            Row::Day(bucket) => println!(
                "  {} {:>6} {}",
                bucket.display_label.dimmed(),
                bucket.count,
                bar(bucket.count, max, BAR_WIDTH).cyan()
            ),
            Row::Quiet { first, last, days } => println!(
                "  {} {:>6} {}",
                format!("{}..{}", first.display_label, last.display_label).dimmed(),
                0,
                format!("({days} days)").dimmed()
            ),
        }
    }
}

/// One printed line of a series.
#[derive(Debug, PartialEq)]
enum Row<'a> {
    Day(&'a Bucket),
    /// Two or more consecutive zero-count days.
    Quiet {
        first: &'a Bucket,
        last: &'a Bucket,
        days: usize,
    },
}

/// Folds runs of empty days into a single row; the buckets are untouched.
fn rows(buckets: &[Bucket]) -> Vec<Row<'_>> {
    let mut rows = Vec::new();
    let mut rest = buckets;

    while let Some(first) = rest.first() {
        let run = rest.iter().take_while(|bucket| bucket.count == 0).count();
        match run {
            0 | 1 => {
                rows.push(Row::Day(first));
                rest = &rest[1..];
            }
            days => {
                rows.push(Row::Quiet {
                    first,
                    last: &rest[days - 1],
                    days,
                });
                rest = &rest[days..];
            }
        }
    }

    rows
}

fn window_label(window: &TimeWindow) -> String {
    format!("{} .. {}", window.start_day(), window.end_day())
}

/// Bar scaled against `max`; any non-zero count gets at least one cell.
fn bar(count: u64, max: u64, width: usize) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let cells = ((count as f64 / max as f64) * width as f64).round() as usize;
    "#".repeat(cells.clamp(1, width))
}
