//! Dashboard report
//!
//! Combines the five entity lists of the admin dashboard into its series,
//! today tiles and catalog counts. Every series of one report shares the
//! same window.

use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::aggregate_series;
use crate::buckets::generate_buckets;
use crate::day_key::{normalize_day_key_in, DayKey};
use crate::range::TimeWindow;
use crate::summary::{breakdown, Category, CategoryTotal};
use crate::types::AggregatedSeries;

const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

/// Lifecycle stage of a repair order (`orderStage`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStage {
    PriceSet,
    TechnicianAssigned,
    InRepair,
    ReadyForPickup,
    Completed,
    #[serde(other)]
    Other,
}

impl OrderStage {
    pub fn parse(value: &str) -> Self {
        match value {
            "PRICE_SET" => Self::PriceSet,
            "TECHNICIAN_ASSIGNED" => Self::TechnicianAssigned,
            "IN_REPAIR" => Self::InRepair,
            "READY_FOR_PICKUP" => Self::ReadyForPickup,
            "COMPLETED" => Self::Completed,
            _ => Self::Other,
        }
    }

    pub fn of(record: &Value) -> Option<Self> {
        record.get("orderStage").and_then(Value::as_str).map(Self::parse)
    }
}

/// Repair outcome flag of an order (`status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    NotRepairable,
    #[serde(other)]
    Other,
}

impl OrderStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "NOT_REPAIRABLE" => Self::NotRepairable,
            _ => Self::Other,
        }
    }

    pub fn of(record: &Value) -> Option<Self> {
        record.get("status").and_then(Value::as_str).map(Self::parse)
    }
}

fn is_completed(order: &Value) -> bool {
    OrderStage::of(order) == Some(OrderStage::Completed)
}

fn is_not_repairable(order: &Value) -> bool {
    OrderStatus::of(order) == Some(OrderStatus::NotRepairable)
}

const COMPLETED: Category<'static> = Category {
    name: "completed",
    date_field: UPDATED_AT,
    predicate: is_completed,
};

const NOT_REPAIRABLE: Category<'static> = Category {
    name: "not_repairable",
    date_field: UPDATED_AT,
    predicate: is_not_repairable,
};

/// Raw entity lists, already unwrapped from their envelopes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSources {
    pub orders: Vec<Value>,
    pub users: Vec<Value>,
    pub brands: Vec<Value>,
    pub models: Vec<Value>,
    pub problems: Vec<Value>,
}

/// Point-in-time tiles shown above the charts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodayTiles {
    pub users_registered_today: u64,
    pub orders_registered_today: u64,
    pub orders_price_set: u64,
    pub orders_technician_assigned: u64,
    pub orders_in_repair: u64,
    pub orders_ready_for_pickup: u64,
    pub orders_completed_today: u64,
    pub orders_not_repairable_today: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogCounts {
    pub brands: u64,
    pub models: u64,
    pub problems: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub window: TimeWindow,
    pub registered_orders: AggregatedSeries,
    pub completed_orders: AggregatedSeries,
    pub not_repairable_orders: AggregatedSeries,
    pub registered_users: AggregatedSeries,
    /// Completed versus not-repairable orders within the window.
    pub outcome_breakdown: Vec<CategoryTotal>,
    pub today: TodayTiles,
    pub catalog: CatalogCounts,
}

/// Build the dashboard for `window`; "today" is the window's last day.
pub fn build_dashboard<Tz: TimeZone>(
    sources: &DashboardSources,
    window: &TimeWindow,
    tz: &Tz,
) -> DashboardReport {
    let skeleton = generate_buckets(window);
    let orders = &sources.orders;

    DashboardReport {
        window: *window,
        registered_orders: AggregatedSeries::from_buckets(aggregate_series(
            &skeleton, orders, CREATED_AT, tz,
        )),
        completed_orders: COMPLETED.series(orders, window, tz),
        not_repairable_orders: NOT_REPAIRABLE.series(orders, window, tz),
        registered_users: AggregatedSeries::from_buckets(aggregate_series(
            &skeleton,
            &sources.users,
            CREATED_AT,
            tz,
        )),
        outcome_breakdown: breakdown(orders, window, &[COMPLETED, NOT_REPAIRABLE], tz),
        today: today_tiles(sources, window.end_day(), tz),
        catalog: CatalogCounts {
            brands: sources.brands.len() as u64,
            models: sources.models.len() as u64,
            problems: sources.problems.len() as u64,
        },
    }
}

fn today_tiles<Tz: TimeZone>(sources: &DashboardSources, today: DayKey, tz: &Tz) -> TodayTiles {
    let orders = &sources.orders;
    let on_today = |raw: Option<&str>| normalize_day_key_in(raw, tz) == Some(today);
    let stage_count = |stage: OrderStage| {
        orders
            .iter()
            .filter(|order| OrderStage::of(order) == Some(stage))
            .count() as u64
    };
    let touched_today = |order: &Value| on_today(last_touched(order));

    TodayTiles {
        users_registered_today: sources
            .users
            .iter()
            .filter(|user| on_today(user.get(CREATED_AT).and_then(Value::as_str)))
            .count() as u64,
        orders_registered_today: orders
            .iter()
            .filter(|order| on_today(order.get(CREATED_AT).and_then(Value::as_str)))
            .count() as u64,
        orders_price_set: stage_count(OrderStage::PriceSet),
        orders_technician_assigned: stage_count(OrderStage::TechnicianAssigned),
        orders_in_repair: stage_count(OrderStage::InRepair),
        orders_ready_for_pickup: stage_count(OrderStage::ReadyForPickup),
        orders_completed_today: orders
            .iter()
            .filter(|order| is_completed(order) && touched_today(*order))
            .count() as u64,
        orders_not_repairable_today: orders
            .iter()
            .filter(|order| is_not_repairable(order) && touched_today(*order))
            .count() as u64,
    }
}

/// `updatedAt`, or `createdAt` when the order was never updated.
fn last_touched(order: &Value) -> Option<&str> {
    order
        .get(UPDATED_AT)
        .and_then(Value::as_str)
        .filter(|raw| !raw.is_empty())
        .or_else(|| order.get(CREATED_AT).and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    use super::*;
    use crate::range::RangePreset;

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .and_then(|date| date.and_hms_opt(14, 0, 0))
            .expect("valid timestamp")
    }

    fn sources() -> DashboardSources {
        DashboardSources {
            orders: vec![
                json!({"id": 1, "createdAt": "2024-01-10T09:00:00Z", "orderStage": "PRICE_SET"}),
                json!({"id": 2, "createdAt": "2024-01-09T09:00:00Z", "orderStage": "IN_REPAIR"}),
                json!({"id": 3, "createdAt": "2024-01-01T09:00:00Z", "orderStage": "COMPLETED",
                       "updatedAt": "2024-01-10T08:00:00Z"}),
                json!({"id": 4, "createdAt": "2024-01-10T07:00:00Z", "orderStage": "COMPLETED"}),
                json!({"id": 5, "createdAt": "2024-01-05T07:00:00Z", "status": "NOT_REPAIRABLE",
                       "updatedAt": "2024-01-06T07:00:00Z", "orderStage": "SOMETHING_NEW"}),
            ],
            users: vec![
                json!({"id": 1, "createdAt": "2024-01-10T10:00:00Z"}),
                json!({"id": 2, "createdAt": "2024-01-08T10:00:00Z"}),
                json!({"id": 3}),
            ],
            brands: vec![json!({"id": 1}), json!({"id": 2})],
            models: vec![json!({"id": 1})],
            problems: vec![],
        }
    }

    #[test]
    fn builds_series_for_the_selected_window() {
        let window = RangePreset::LastSevenDays.resolve(now());
        let report = build_dashboard(&sources(), &window, &Utc);

        assert_eq!(report.registered_orders.len(), 7);
        assert_eq!(report.registered_orders.total, 4);
        assert_eq!(report.registered_users.total, 2);
        // order 4 has no updatedAt, so it never shows up in the completed series
        assert_eq!(report.completed_orders.total, 1);
        assert_eq!(report.not_repairable_orders.total, 1);

        let totals: Vec<u64> = report.outcome_breakdown.iter().map(|t| t.total).collect();
        assert_eq!(totals, [1, 1]);
        assert_eq!(report.catalog, CatalogCounts { brands: 2, models: 1, problems: 0 });
    }

    #[test]
    fn today_tiles_count_open_stages_and_todays_changes() {
        let window = RangePreset::LastSevenDays.resolve(now());
        let report = build_dashboard(&sources(), &window, &Utc);

        assert_eq!(
            report.today,
            TodayTiles {
                users_registered_today: 1,
                orders_registered_today: 2,
                orders_price_set: 1,
                orders_technician_assigned: 0,
                orders_in_repair: 1,
                orders_ready_for_pickup: 0,
                orders_completed_today: 2,
                orders_not_repairable_today: 0,
            }
        );
    }

    #[test]
    fn unknown_discriminators_are_tolerated() {
        assert_eq!(OrderStage::parse("SOMETHING_NEW"), OrderStage::Other);
        assert_eq!(OrderStatus::of(&json!({"status": 3})), None);
        assert_eq!(OrderStage::of(&json!({})), None);
    }
}
