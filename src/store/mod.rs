// ============================================================================
// Persistence Layer
// ============================================================================
//
// `Store` is the only seam between business logic and storage.
//
// Implementations:
// - postgres/ - sqlx + PostgreSQL, transactional, used in production
// - memory/   - single-mutex in-memory store, used by tests and demo mode
// - seed/     - starter catalog for stores that skip migrations
//
// Both must honour the same atomicity contract:
// - stock check-and-decrement is one indivisible step
// - order creation (customer upsert, number allocation, order, items,
//   stock) is all-or-nothing
// - order deletion removes the order and its items together
//
// ============================================================================

mod memory;
mod postgres;
mod seed;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use seed::seed_catalog;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::catalog::{
    DeliveryPerson, DeliveryPersonChanges, Flavor, FlavorChanges, FlavorKind, NewDeliveryPerson,
    NewFlavor, NewProduct, Product, ProductChanges, StockRequirement,
};
use crate::domain::customer::{Customer, NewCustomer, PhoneNumber};
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::error::AppError;

pub type StoreResult<T> = Result<T, AppError>;

/// Everything needed to persist a freshly placed order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer: NewCustomer,
    pub delivery_person: DeliveryPerson,
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,
    pub observations: Option<String>,
    pub is_scheduled: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Merged per counter, in the order they must be applied.
    pub stock: Vec<StockRequirement>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a status-guarded order replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    Missing,
    /// Another writer moved the order on since it was read.
    StatusChanged(OrderStatus),
}

/// Order listing filter. Bounds are on `created_at`, `[from, until)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub created_from: Option<DateTime<Utc>>,
    pub created_until: Option<DateTime<Utc>>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// Orders created on the given local calendar day.
    pub fn for_day(date: NaiveDate) -> Self {
        let next = date.succ_opt().unwrap_or(date);
        Self {
            created_from: Some(local_midnight(date)),
            created_until: Some(local_midnight(next)),
            status: None,
        }
    }

    pub fn with_status(mut self, status: Option<OrderStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.created_from.map_or(true, |from| order.created_at >= from)
            && self.created_until.map_or(true, |until| order.created_at < until)
            && self.status.map_or(true, |status| order.status == status)
    }
}

fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> StoreResult<()>;

    // Products
    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>>;
    async fn create_product(&self, product: NewProduct) -> StoreResult<Product>;
    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> StoreResult<Option<Product>>;
    /// Atomic check-and-decrement of one product's stock.
    async fn reduce_stock(&self, id: Uuid, quantity: i32) -> StoreResult<Product>;

    // Flavors
    async fn list_flavors(&self, kind: FlavorKind) -> StoreResult<Vec<Flavor>>;
    async fn create_flavor(&self, kind: FlavorKind, flavor: NewFlavor) -> StoreResult<Flavor>;
    async fn update_flavor(
        &self,
        kind: FlavorKind,
        id: Uuid,
        changes: FlavorChanges,
    ) -> StoreResult<Option<Flavor>>;

    // Delivery staff
    async fn list_delivery_persons(&self) -> StoreResult<Vec<DeliveryPerson>>;
    async fn get_delivery_person(&self, id: Uuid) -> StoreResult<Option<DeliveryPerson>>;
    async fn create_delivery_person(&self, person: NewDeliveryPerson) -> StoreResult<DeliveryPerson>;
    async fn update_delivery_person(
        &self,
        id: Uuid,
        changes: DeliveryPersonChanges,
    ) -> StoreResult<Option<DeliveryPerson>>;

    // Customers
    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;
    async fn find_customer_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<Customer>>;

    // Orders
    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>>;
    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>>;
    async fn create_order(&self, order: NewOrder) -> StoreResult<Order>;
    /// Replace the mutable fields of an order whose stored status is still `expected`.
    async fn replace_order(&self, order: &Order, expected: OrderStatus) -> StoreResult<ReplaceOutcome>;
    async fn delete_order(&self, id: Uuid) -> StoreResult<bool>;
}
