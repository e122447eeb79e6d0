// Private module declaration
mod server;

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::catalog::StockCounter;
use crate::domain::order::OrderStatus;

// Re-export for public API
pub use server::{metrics_handler, render};

// ============================================================================
// Metrics Module - Prometheus metrics for the order service
// ============================================================================
//
// Provides counters for:
// - Orders created / deleted and the value they carry
// - Workflow transitions by target status
// - Stock rejections by counter
//
// All metrics are registered with one Registry and scraped via /api/metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Order lifecycle
    pub orders_created: IntCounter,
    pub orders_deleted: IntCounter,
    pub order_value_cents: IntCounter,
    pub order_transitions: IntCounterVec,

    // Stock
    pub stock_rejections: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_deleted = IntCounter::new("orders_deleted_total", "Total orders deleted")?;
        registry.register(Box::new(orders_deleted.clone()))?;

        let order_value_cents = IntCounter::new(
            "order_value_cents_total",
            "Sum of created order totals, in cents",
        )?;
        registry.register(Box::new(order_value_cents.clone()))?;

        let order_transitions = IntCounterVec::new(
            Opts::new("order_transitions_total", "Order workflow transitions"),
            &["to"],
        )?;
        registry.register(Box::new(order_transitions.clone()))?;

        let stock_rejections = IntCounterVec::new(
            Opts::new("stock_rejections_total", "Requests rejected for insufficient stock"),
            &["counter"],
        )?;
        registry.register(Box::new(stock_rejections.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            orders_deleted,
            order_value_cents,
            order_transitions,
            stock_rejections,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_created(&self, total: Decimal) {
        self.orders_created.inc();
        let cents = total
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.round().to_u64())
            .unwrap_or(0);
        self.order_value_cents.inc_by(cents);
    }

    pub fn record_order_deleted(&self) {
        self.orders_deleted.inc();
    }

    pub fn record_transition(&self, to: OrderStatus) {
        self.order_transitions.with_label_values(&[to.as_str()]).inc();
    }

    /// Beverage counters are labelled "product" to keep label cardinality bounded.
    pub fn record_stock_rejection(&self, counter: StockCounter) {
        let label = match counter {
            StockCounter::Product(_) => "product",
            StockCounter::Dough(dough) => dough.as_str(),
        };
        self.stock_rejections.with_label_values(&[label]).inc();
    }
}
