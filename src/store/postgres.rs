use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::catalog::{
    DeliveryPerson, DeliveryPersonChanges, Flavor, FlavorChanges, FlavorKind, NewDeliveryPerson,
    NewFlavor, NewProduct, Product, ProductChanges, StockCounter, StockError,
};
use crate::domain::customer::{Customer, PhoneNumber};
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::pricing::PizzaConfiguration;
use crate::domain::ParseVariantError;
use crate::error::AppError;
use super::{NewOrder, OrderFilter, ReplaceOutcome, Store, StoreResult};

// ============================================================================
// PostgreSQL Store
// ============================================================================
//
// Enum columns are stored as text and parsed on the way out; an unknown
// value surfaces as `sqlx::Error::Decode`.
//
// Stock counters are only ever changed by a conditional
// `UPDATE ... WHERE stock_quantity >= $n`, so the check and the decrement
// are one statement.
//
// ============================================================================

const PRODUCT_COLUMNS: &str =
    "id, name, category, price, description, in_stock, stock_quantity, dough_type";
const FLAVOR_COLUMNS: &str = "id, name, category, price, active";
const DELIVERY_PERSON_COLUMNS: &str = "id, name, transport, phone, active, created_at";
const CUSTOMER_COLUMNS: &str = "id, name, phone, address, complement";

const ORDER_SELECT: &str = "
    SELECT o.id, o.order_number, o.total_price, o.status, o.observations,
           o.is_scheduled, o.scheduled_at, o.created_at, o.updated_at, o.delivered_at,
           c.id AS customer_id, c.name AS customer_name, c.phone AS customer_phone,
           c.address AS customer_address, c.complement AS customer_complement,
           d.id AS delivery_person_id, d.name AS delivery_person_name,
           d.transport AS delivery_person_transport, d.phone AS delivery_person_phone,
           d.active AS delivery_person_active, d.created_at AS delivery_person_created_at
    FROM orders o
    JOIN customers c ON c.id = o.customer_id
    JOIN delivery_persons d ON d.id = o.delivery_person_id";

fn decode<T>(value: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ParseVariantError>,
{
    value
        .parse()
        .map_err(|e: ParseVariantError| sqlx::Error::Decode(Box::new(e)))
}

fn flavor_table(kind: FlavorKind) -> &'static str {
    match kind {
        FlavorKind::Pizza => "pizza_flavors",
        FlavorKind::Esfiha => "esfiha_flavors",
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    category: String,
    price: Decimal,
    description: Option<String>,
    in_stock: bool,
    stock_quantity: i32,
    dough_type: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = sqlx::Error;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            name: row.name,
            category: decode(&row.category)?,
            price: row.price,
            description: row.description,
            in_stock: row.in_stock,
            stock_quantity: row.stock_quantity,
            dough_type: row.dough_type.as_deref().map(decode).transpose()?,
        })
    }
}

#[derive(Debug, FromRow)]
struct FlavorRow {
    id: Uuid,
    name: String,
    category: String,
    price: Decimal,
    active: bool,
}

impl TryFrom<FlavorRow> for Flavor {
    type Error = sqlx::Error;

    fn try_from(row: FlavorRow) -> Result<Self, Self::Error> {
        Ok(Flavor {
            id: row.id,
            name: row.name,
            category: decode(&row.category)?,
            price: row.price,
            active: row.active,
        })
    }
}

#[derive(Debug, FromRow)]
struct DeliveryPersonRow {
    id: Uuid,
    name: String,
    transport: String,
    phone: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<DeliveryPersonRow> for DeliveryPerson {
    type Error = sqlx::Error;

    fn try_from(row: DeliveryPersonRow) -> Result<Self, Self::Error> {
        Ok(DeliveryPerson {
            id: row.id,
            name: row.name,
            transport: decode(&row.transport)?,
            phone: row.phone,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    phone: String,
    address: String,
    complement: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            phone: PhoneNumber::new(row.phone),
            address: row.address,
            complement: row.complement,
        }
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: i64,
    total_price: Decimal,
    status: String,
    observations: Option<String>,
    is_scheduled: bool,
    scheduled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
    customer_id: Uuid,
    customer_name: String,
    customer_phone: String,
    customer_address: String,
    customer_complement: Option<String>,
    delivery_person_id: Uuid,
    delivery_person_name: String,
    delivery_person_transport: String,
    delivery_person_phone: Option<String>,
    delivery_person_active: bool,
    delivery_person_created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, sqlx::Error> {
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer: Customer {
                id: self.customer_id,
                name: self.customer_name,
                phone: PhoneNumber::new(self.customer_phone),
                address: self.customer_address,
                complement: self.customer_complement,
            },
            delivery_person: DeliveryPerson {
                id: self.delivery_person_id,
                name: self.delivery_person_name,
                transport: decode(&self.delivery_person_transport)?,
                phone: self.delivery_person_phone,
                active: self.delivery_person_active,
                created_at: self.delivery_person_created_at,
            },
            items,
            total_price: self.total_price,
            status: decode::<OrderStatus>(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            delivered_at: self.delivered_at,
            observations: self.observations,
            is_scheduled: self.is_scheduled,
            scheduled_at: self.scheduled_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    item_type: String,
    product_id: Option<Uuid>,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
    pizza_details: Option<Json<PizzaConfiguration>>,
    observations: Option<String>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = sqlx::Error;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(OrderItem {
            id: row.id,
            item_type: decode(&row.item_type)?,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
            pizza_details: row.pizza_details.map(|Json(details)| details),
            observations: row.observations,
        })
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self::new(pool))
    }

    /// Apply pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Load the items of the given orders, grouped by order id in position order.
    async fn load_items(&self, order_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<OrderItem>>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, item_type, product_id, product_name, quantity,
                    unit_price, total_price, pizza_details, observations
             FROM order_items
             WHERE order_id = ANY($1)
             ORDER BY order_id, position",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            grouped.entry(order_id).or_default().push(OrderItem::try_from(row)?);
        }
        Ok(grouped)
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.load_items(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items).map_err(AppError::from)
            })
            .collect()
    }
}

/// Conditionally decrement one stock counter.
///
/// Returns `Ok(None)` when the counter is a dough type with no counter row,
/// which means that item type is not stock-gated.
async fn decrement_counter(
    conn: &mut PgConnection,
    counter: StockCounter,
    quantity: i32,
) -> StoreResult<Option<Product>> {
    if quantity < 1 {
        return Err(AppError::from_stock(counter, StockError::InvalidQuantity(quantity)));
    }

    let (predicate, key) = match counter {
        StockCounter::Product(id) => ("id = $1", CounterKey::Id(id)),
        StockCounter::Dough(dough) => ("dough_type = $1", CounterKey::Dough(dough.as_str())),
    };

    let update = format!(
        "UPDATE products
         SET stock_quantity = stock_quantity - $2,
             in_stock = stock_quantity - $2 > 0
         WHERE {} AND stock_quantity >= $2
         RETURNING {}",
        predicate, PRODUCT_COLUMNS
    );
    let updated = key
        .bind_to(sqlx::query_as::<_, ProductRow>(&update))
        .bind(quantity)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(row) = updated {
        return Ok(Some(Product::try_from(row)?));
    }

    let lookup = format!("SELECT stock_quantity FROM products WHERE {}", predicate);
    let available: Option<i32> = key
        .bind_scalar(sqlx::query_scalar::<_, i32>(&lookup))
        .fetch_optional(&mut *conn)
        .await?;

    match (available, counter) {
        (Some(available), _) => Err(AppError::InsufficientStock {
            counter,
            requested: quantity,
            available,
        }),
        (None, StockCounter::Product(id)) => Err(AppError::not_found(format!("Product {}", id))),
        (None, StockCounter::Dough(_)) => Ok(None),
    }
}

#[derive(Clone, Copy)]
enum CounterKey {
    Id(Uuid),
    Dough(&'static str),
}

type PgQueryAs<'q, O> = sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>;
type PgQueryScalar<'q, O> =
    sqlx::query::QueryScalar<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>;

impl CounterKey {
    fn bind_to<'q, O>(self, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        match self {
            CounterKey::Id(id) => query.bind(id),
            CounterKey::Dough(dough) => query.bind(dough),
        }
    }

    fn bind_scalar<'q, O>(self, query: PgQueryScalar<'q, O>) -> PgQueryScalar<'q, O> {
        match self {
            CounterKey::Id(id) => query.bind(id),
            CounterKey::Dough(dough) => query.bind(dough),
        }
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------------

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {} FROM products ORDER BY category, name", PRODUCT_COLUMNS);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::try_from).collect::<Result<_, _>>()?)
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::try_from).transpose()?)
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let quantity = product.stock_quantity.max(0);
        let sql = format!(
            "INSERT INTO products (id, name, category, price, description, in_stock, stock_quantity, dough_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&product.name)
            .bind(product.category.as_str())
            .bind(product.price)
            .bind(&product.description)
            .bind(quantity > 0)
            .bind(quantity)
            .bind(product.dough_type.map(|d| d.as_str()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => AppError::validation(
                    "A dough counter for this dough type already exists",
                ),
                other => AppError::from(other),
            })?;
        Ok(Product::try_from(row)?)
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> StoreResult<Option<Product>> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {} FROM products WHERE id = $1 FOR UPDATE", PRODUCT_COLUMNS);
        let Some(row) = sqlx::query_as::<_, ProductRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut product = Product::try_from(row)?;
        product.apply(changes);

        sqlx::query(
            "UPDATE products
             SET name = $2, category = $3, price = $4, description = $5,
                 in_stock = $6, stock_quantity = $7
             WHERE id = $1",
        )
        .bind(id)
        .bind(&product.name)
        .bind(product.category.as_str())
        .bind(product.price)
        .bind(&product.description)
        .bind(product.in_stock)
        .bind(product.stock_quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(product))
    }

    async fn reduce_stock(&self, id: Uuid, quantity: i32) -> StoreResult<Product> {
        let mut tx = self.pool.begin().await?;
        let product = decrement_counter(&mut tx, StockCounter::Product(id), quantity)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
        tx.commit().await?;
        Ok(product)
    }

    // ------------------------------------------------------------------------
    // Flavors
    // ------------------------------------------------------------------------

    async fn list_flavors(&self, kind: FlavorKind) -> StoreResult<Vec<Flavor>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY category, name",
            FLAVOR_COLUMNS,
            flavor_table(kind)
        );
        let rows = sqlx::query_as::<_, FlavorRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Flavor::try_from).collect::<Result<_, _>>()?)
    }

    async fn create_flavor(&self, kind: FlavorKind, flavor: NewFlavor) -> StoreResult<Flavor> {
        let sql = format!(
            "INSERT INTO {} (id, name, category, price, active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            flavor_table(kind),
            FLAVOR_COLUMNS
        );
        let row = sqlx::query_as::<_, FlavorRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&flavor.name)
            .bind(flavor.category.as_str())
            .bind(flavor.price)
            .bind(flavor.active)
            .fetch_one(&self.pool)
            .await?;
        Ok(Flavor::try_from(row)?)
    }

    async fn update_flavor(
        &self,
        kind: FlavorKind,
        id: Uuid,
        changes: FlavorChanges,
    ) -> StoreResult<Option<Flavor>> {
        let table = flavor_table(kind);
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {} FROM {} WHERE id = $1 FOR UPDATE", FLAVOR_COLUMNS, table);
        let Some(row) = sqlx::query_as::<_, FlavorRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut flavor = Flavor::try_from(row)?;
        flavor.apply(changes);

        let update = format!(
            "UPDATE {} SET name = $2, category = $3, price = $4, active = $5 WHERE id = $1",
            table
        );
        sqlx::query(&update)
            .bind(id)
            .bind(&flavor.name)
            .bind(flavor.category.as_str())
            .bind(flavor.price)
            .bind(flavor.active)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(flavor))
    }

    // ------------------------------------------------------------------------
    // Delivery staff
    // ------------------------------------------------------------------------

    async fn list_delivery_persons(&self) -> StoreResult<Vec<DeliveryPerson>> {
        let sql = format!("SELECT {} FROM delivery_persons ORDER BY name", DELIVERY_PERSON_COLUMNS);
        let rows = sqlx::query_as::<_, DeliveryPersonRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(DeliveryPerson::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn get_delivery_person(&self, id: Uuid) -> StoreResult<Option<DeliveryPerson>> {
        let sql = format!("SELECT {} FROM delivery_persons WHERE id = $1", DELIVERY_PERSON_COLUMNS);
        let row = sqlx::query_as::<_, DeliveryPersonRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(DeliveryPerson::try_from).transpose()?)
    }

    async fn create_delivery_person(&self, person: NewDeliveryPerson) -> StoreResult<DeliveryPerson> {
        let sql = format!(
            "INSERT INTO delivery_persons (id, name, transport, phone, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            DELIVERY_PERSON_COLUMNS
        );
        let row = sqlx::query_as::<_, DeliveryPersonRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&person.name)
            .bind(person.transport.as_str())
            .bind(&person.phone)
            .bind(person.active)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(DeliveryPerson::try_from(row)?)
    }

    async fn update_delivery_person(
        &self,
        id: Uuid,
        changes: DeliveryPersonChanges,
    ) -> StoreResult<Option<DeliveryPerson>> {
        let mut tx = self.pool.begin().await?;

        let select = format!(
            "SELECT {} FROM delivery_persons WHERE id = $1 FOR UPDATE",
            DELIVERY_PERSON_COLUMNS
        );
        let Some(row) = sqlx::query_as::<_, DeliveryPersonRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut person = DeliveryPerson::try_from(row)?;
        person.apply(changes);

        sqlx::query(
            "UPDATE delivery_persons SET name = $2, transport = $3, phone = $4, active = $5 WHERE id = $1",
        )
        .bind(id)
        .bind(&person.name)
        .bind(person.transport.as_str())
        .bind(&person.phone)
        .bind(person.active)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(person))
    }

    // ------------------------------------------------------------------------
    // Customers
    // ------------------------------------------------------------------------

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        let sql = format!("SELECT {} FROM customers ORDER BY name", CUSTOMER_COLUMNS);
        let rows = sqlx::query_as::<_, CustomerRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn find_customer_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<Customer>> {
        let sql = format!("SELECT {} FROM customers WHERE phone = $1", CUSTOMER_COLUMNS);
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(phone.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Customer::from))
    }

    // ------------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------------

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let sql = format!(
            "{}
             WHERE ($1::timestamptz IS NULL OR o.created_at >= $1)
               AND ($2::timestamptz IS NULL OR o.created_at < $2)
               AND ($3::text IS NULL OR o.status = $3)
             ORDER BY o.created_at DESC, o.order_number DESC",
            ORDER_SELECT
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(filter.created_from)
            .bind(filter.created_until)
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;

        self.assemble(rows).await
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let sql = format!("{} WHERE o.id = $1", ORDER_SELECT);
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_order(&self, order: NewOrder) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;

        let person_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM delivery_persons WHERE id = $1)")
                .bind(order.delivery_person.id)
                .fetch_one(&mut *tx)
                .await?;
        if !person_exists {
            return Err(AppError::validation(format!(
                "Unknown delivery person: {}",
                order.delivery_person.id
            )));
        }

        // Counters are pre-sorted, so concurrent orders lock rows in the same order.
        for requirement in &order.stock {
            decrement_counter(&mut tx, requirement.counter, requirement.quantity).await?;
        }

        let upsert = format!(
            "INSERT INTO customers (id, name, phone, address, complement)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (phone) DO UPDATE
             SET name = EXCLUDED.name, address = EXCLUDED.address, complement = EXCLUDED.complement
             RETURNING {}",
            CUSTOMER_COLUMNS
        );
        let customer: Customer = sqlx::query_as::<_, CustomerRow>(&upsert)
            .bind(Uuid::new_v4())
            .bind(&order.customer.name)
            .bind(order.customer.phone.as_str())
            .bind(&order.customer.address)
            .bind(&order.customer.complement)
            .fetch_one(&mut *tx)
            .await?
            .into();

        let order_number: i64 = sqlx::query_scalar(
            "UPDATE order_sequence SET last_number = last_number + 1 WHERE id = 1 RETURNING last_number",
        )
        .fetch_one(&mut *tx)
        .await?;

        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO orders (id, order_number, customer_id, delivery_person_id, total_price,
                                 status, observations, is_scheduled, scheduled_at,
                                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)",
        )
        .bind(id)
        .bind(order_number)
        .bind(customer.id)
        .bind(order.delivery_person.id)
        .bind(order.total_price)
        .bind(OrderStatus::NotStarted.as_str())
        .bind(&order.observations)
        .bind(order.is_scheduled)
        .bind(order.scheduled_at)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, position, item_type, product_id, product_name,
                                          quantity, unit_price, total_price, pizza_details, observations)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            )
            .bind(item.id)
            .bind(id)
            .bind(position as i32)
            .bind(item.item_type.as_str())
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .bind(item.pizza_details.as_ref().map(Json))
            .bind(&item.observations)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order {
            id,
            order_number,
            customer,
            delivery_person: order.delivery_person,
            items: order.items,
            total_price: order.total_price,
            status: OrderStatus::NotStarted,
            created_at: order.created_at,
            updated_at: order.created_at,
            delivered_at: None,
            observations: order.observations,
            is_scheduled: order.is_scheduled,
            scheduled_at: order.scheduled_at,
        })
    }

    async fn replace_order(&self, order: &Order, expected: OrderStatus) -> StoreResult<ReplaceOutcome> {
        let result = sqlx::query(
            "UPDATE orders
             SET status = $2, observations = $3, delivery_person_id = $4,
                 updated_at = $5, delivered_at = $6
             WHERE id = $1 AND status = $7",
        )
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(&order.observations)
        .bind(order.delivery_person.id)
        .bind(order.updated_at)
        .bind(order.delivered_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(ReplaceOutcome::Replaced);
        }

        let current: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(order.id)
            .fetch_optional(&self.pool)
            .await?;
        match current {
            Some(status) => Ok(ReplaceOutcome::StatusChanged(decode(&status)?)),
            None => Ok(ReplaceOutcome::Missing),
        }
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{merge_requirements, ProductCategory, StockRequirement, Transport};
    use crate::domain::customer::NewCustomer;
    use std::sync::Arc;

    #[test]
    fn test_decode_rejects_unknown_variant() {
        let err = decode::<OrderStatus>("cancelled").unwrap_err();
        assert!(matches!(err, sqlx::Error::Decode(_)));
        assert_eq!(decode::<OrderStatus>("in-progress").unwrap(), OrderStatus::InProgress);
    }

    #[test]
    fn test_product_row_conversion() {
        let row = ProductRow {
            id: Uuid::new_v4(),
            name: "Massa de Pizza".to_string(),
            category: "bebida".to_string(),
            price: Decimal::ZERO,
            description: None,
            in_stock: true,
            stock_quantity: 50,
            dough_type: Some("pizza".to_string()),
        };

        let product = Product::try_from(row).unwrap();
        assert_eq!(product.dough_type, Some(crate::domain::catalog::DoughType::Pizza));
        assert_eq!(product.stock_quantity, 50);
    }

    #[test]
    fn test_flavor_tables() {
        assert_eq!(flavor_table(FlavorKind::Pizza), "pizza_flavors");
        assert_eq!(flavor_table(FlavorKind::Esfiha), "esfiha_flavors");
    }

    // ------------------------------------------------------------------------
    // Live database tests: `PIZZARIA_TEST_DATABASE_URL=postgres://... cargo test -- --ignored`
    // ------------------------------------------------------------------------

    async fn live_store() -> Arc<PostgresStore> {
        let url = std::env::var("PIZZARIA_TEST_DATABASE_URL")
            .expect("PIZZARIA_TEST_DATABASE_URL must point at a scratch database");
        let config = DatabaseConfig { url, ..DatabaseConfig::default() };
        let store = PostgresStore::connect(&config).await.unwrap();
        store.migrate().await.unwrap();
        Arc::new(store)
    }

    async fn last_unit(store: &PostgresStore) -> Product {
        store
            .create_product(NewProduct {
                name: format!("Guaraná {}", Uuid::new_v4()),
                category: ProductCategory::Bebida,
                price: Decimal::new(900, 2),
                description: None,
                stock_quantity: 1,
                dough_type: None,
            })
            .await
            .unwrap()
    }

    fn count_outcomes<T>(results: &[Result<StoreResult<T>, tokio::task::JoinError>]) -> (usize, usize) {
        let successes = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
        let rejections = results
            .iter()
            .filter(|r| matches!(r, Ok(Err(AppError::InsufficientStock { .. }))))
            .count();
        (successes, rejections)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "needs PIZZARIA_TEST_DATABASE_URL"]
    async fn test_concurrent_reduce_stock_of_last_unit_has_one_winner() {
        let store = live_store().await;
        let product = last_unit(&store).await;

        let attempts: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.reduce_stock(product.id, 1).await })
            })
            .collect();
        let results = futures_util::future::join_all(attempts).await;

        assert_eq!(count_outcomes(&results), (1, 1));
        let after = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 0);
        assert!(!after.in_stock);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "needs PIZZARIA_TEST_DATABASE_URL"]
    async fn test_concurrent_orders_for_last_unit_have_one_winner() {
        let store = live_store().await;
        let product = last_unit(&store).await;
        let rider = store
            .create_delivery_person(NewDeliveryPerson {
                name: "Pedro Oliveira".to_string(),
                transport: Transport::Bicicleta,
                phone: None,
                active: true,
            })
            .await
            .unwrap();

        let attempts: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                let order = NewOrder {
                    customer: NewCustomer {
                        name: "Carla".to_string(),
                        phone: PhoneNumber::new(Uuid::new_v4().to_string()),
                        address: "Rua C, 3".to_string(),
                        complement: None,
                    },
                    delivery_person: rider.clone(),
                    items: vec![],
                    total_price: product.price,
                    observations: None,
                    is_scheduled: false,
                    scheduled_at: None,
                    stock: merge_requirements(vec![StockRequirement {
                        counter: StockCounter::Product(product.id),
                        quantity: 1,
                    }])
                    .unwrap(),
                    created_at: Utc::now(),
                };
                tokio::spawn(async move { store.create_order(order).await })
            })
            .collect();
        let results = futures_util::future::join_all(attempts).await;

        assert_eq!(count_outcomes(&results), (1, 1));
        let after = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 0);
    }
}
