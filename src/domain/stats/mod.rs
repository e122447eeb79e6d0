use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::catalog::{DeliveryPerson, Transport};
use crate::domain::order::{Order, OrderStatus};

// ============================================================================
// Stats Aggregator
// ============================================================================
//
// Pure folds over an order set. "Today" is the local calendar date of the
// server; callers pass it in so results are reproducible.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub orders_by_status: BTreeMap<OrderStatus, u64>,
}

/// Summarise the orders created on `date`, optionally restricted to one status.
pub fn summarize_day<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
    date: NaiveDate,
    status: Option<OrderStatus>,
) -> DaySummary {
    let mut summary = DaySummary {
        date,
        total_orders: 0,
        total_revenue: Decimal::ZERO,
        orders_by_status: BTreeMap::new(),
    };

    for order in orders {
        if local_date(order) != date || status.map_or(false, |s| s != order.status) {
            continue;
        }
        summary.total_orders += 1;
        summary.total_revenue = summary.total_revenue.saturating_add(order.total_price);
        *summary.orders_by_status.entry(order.status).or_insert(0) += 1;
    }

    summary
}

fn local_date(order: &Order) -> NaiveDate {
    order.created_at.with_timezone(&Local).date_naive()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStats {
    pub delivery_person_id: Uuid,
    pub name: String,
    pub transport: Transport,
    /// Orders in `completed` or `delivered`, all time.
    pub total_deliveries: u64,
    /// Orders delivered on the reference date.
    pub today_deliveries: u64,
    /// Sum of delivered order totals, all time.
    pub total_value: Decimal,
}

/// Per-person delivery figures for every active delivery person.
///
/// Sorted by today's deliveries, then total value (both descending), then name.
pub fn delivery_ranking<'a>(
    persons: &[DeliveryPerson],
    orders: impl IntoIterator<Item = &'a Order>,
    today: NaiveDate,
) -> Vec<DeliveryStats> {
    let mut by_person: BTreeMap<Uuid, DeliveryStats> = persons
        .iter()
        .filter(|p| p.active)
        .map(|p| {
            (
                p.id,
                DeliveryStats {
                    delivery_person_id: p.id,
                    name: p.name.clone(),
                    transport: p.transport,
                    total_deliveries: 0,
                    today_deliveries: 0,
                    total_value: Decimal::ZERO,
                },
            )
        })
        .collect();

    for order in orders {
        let Some(stats) = by_person.get_mut(&order.delivery_person.id) else {
            continue;
        };
        if matches!(order.status, OrderStatus::Completed | OrderStatus::Delivered) {
            stats.total_deliveries += 1;
        }
        if order.status == OrderStatus::Delivered {
            stats.total_value = stats.total_value.saturating_add(order.total_price);
            let delivered_today = order
                .delivered_at
                .map_or(false, |at| at.with_timezone(&Local).date_naive() == today);
            if delivered_today {
                stats.today_deliveries += 1;
            }
        }
    }

    let mut ranking: Vec<DeliveryStats> = by_person.into_values().collect();
    ranking.sort_by(|a, b| {
        b.today_deliveries
            .cmp(&a.today_deliveries)
            .then(b.total_value.cmp(&a.total_value))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranking
}

// ============================================================================
// Unit Tests
// ============================================================================
