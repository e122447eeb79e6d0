use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::aggregate::{Aggregate, DomainEvent};
use crate::domain::catalog::{
    merge_requirements, DoughType, Flavor, FlavorKind, Product, ProductCategory, StockCounter,
    StockRequirement,
};
use crate::domain::pricing::{
    cart_total, find_extra, line_total, price_pizza, PizzaConfiguration, PizzaExtra, PricingError,
};
use crate::error::AppError;
use crate::metrics::Metrics;
use crate::store::{NewOrder, ReplaceOutcome, Store};

use super::aggregate::Order;
use super::commands::{CartLine, OrderChanges, OrderCommand, PizzaSelection, PlaceOrder};
use super::errors::OrderError;
use super::events::OrderEvent;
use super::value_objects::{ItemType, OrderItem};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Placing:  PlaceOrder → validate → price against the catalog → Store
// Changing: OrderCommand → Aggregate → Events → whole-record replace
//
// Every validation runs before the store is touched, so a rejected order
// leaves no trace.
//
// ============================================================================

pub struct OrderCommandHandler {
    store: Arc<dyn Store>,
    metrics: Arc<Metrics>,
}

/// Active catalog entries needed to price one cart.
#[derive(Default)]
struct CartCatalog {
    pizza_flavors: Vec<Flavor>,
    esfiha_flavors: Vec<Flavor>,
    products: Vec<Product>,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn Store>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    pub async fn place(&self, command: PlaceOrder) -> Result<Order, AppError> {
        self.place_at(command, Utc::now()).await
    }

    /// Validate, price and persist a new order as of `now`.
    pub async fn place_at(&self, command: PlaceOrder, now: DateTime<Utc>) -> Result<Order, AppError> {
        command.customer.validate()?;
        if command.lines.is_empty() {
            return Err(OrderError::EmptyItems.into());
        }
        let delivery_person_id = command
            .delivery_person_id
            .ok_or(OrderError::MissingDeliveryPerson)?;
        let scheduled_at = validate_schedule(command.is_scheduled, command.scheduled_at, now)?;
        for line in &command.lines {
            let quantity = line.quantity();
            if quantity < 1 {
                return Err(OrderError::InvalidQuantity(quantity).into());
            }
        }

        let delivery_person = self
            .store
            .get_delivery_person(delivery_person_id)
            .await?
            .ok_or_else(|| {
                AppError::validation(format!("Unknown delivery person: {}", delivery_person_id))
            })?;
        if !delivery_person.active {
            return Err(OrderError::InactiveDeliveryPerson(delivery_person_id).into());
        }

        let catalog = self.load_catalog(&command.lines).await?;

        let mut items = Vec::with_capacity(command.lines.len());
        let mut requirements = Vec::with_capacity(command.lines.len());
        for line in command.lines {
            let (item, requirement) = build_item(line, &catalog)?;
            items.push(item);
            requirements.push(requirement);
        }
        let total_price = cart_total(&items).map_err(total_out_of_range)?;
        let stock = merge_requirements(requirements)
            .map_err(|e| AppError::validation(e.to_string()))?;

        let new_order = NewOrder {
            customer: command.customer,
            delivery_person,
            items,
            total_price,
            observations: command.observations,
            is_scheduled: command.is_scheduled,
            scheduled_at,
            stock,
            created_at: now,
        };

        match self.store.create_order(new_order).await {
            Ok(order) => {
                self.metrics.record_order_created(order.total_price);
                tracing::info!(
                    order_id = %order.id,
                    order_number = order.order_number,
                    item_count = order.items.len(),
                    total_price = %order.total_price,
                    "Order created"
                );
                Ok(order)
            }
            Err(AppError::InsufficientStock { counter, requested, available }) => {
                self.metrics.record_stock_rejection(counter);
                tracing::warn!(
                    counter = %counter,
                    requested = requested,
                    available = available,
                    "Order rejected: insufficient stock"
                );
                Err(AppError::InsufficientStock { counter, requested, available })
            }
            Err(e) => Err(e),
        }
    }

    /// Run a single workflow command against a stored order.
    pub async fn handle(&self, order_id: Uuid, command: OrderCommand) -> Result<Order, AppError> {
        self.execute_all(order_id, vec![command]).await
    }

    /// Apply a partial edit, resolving the delivery person first.
    pub async fn update(&self, order_id: Uuid, changes: OrderChanges) -> Result<Order, AppError> {
        let mut commands = Vec::new();

        if let Some(observations) = changes.observations {
            let observations = Some(observations).filter(|o| !o.trim().is_empty());
            commands.push(OrderCommand::UpdateObservations { observations });
        }
        if let Some(id) = changes.delivery_person_id {
            let delivery_person = self
                .store
                .get_delivery_person(id)
                .await?
                .ok_or_else(|| AppError::validation(format!("Unknown delivery person: {}", id)))?;
            commands.push(OrderCommand::AssignDeliveryPerson { delivery_person });
        }
        if let Some(to) = changes.status {
            commands.push(OrderCommand::ChangeStatus { to });
        }

        self.execute_all(order_id, commands).await
    }

    pub async fn delete(&self, order_id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_order(order_id).await? {
            return Err(AppError::not_found(format!("Order {}", order_id)));
        }

        self.metrics.record_order_deleted();
        tracing::info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    async fn execute_all(&self, order_id: Uuid, commands: Vec<OrderCommand>) -> Result<Order, AppError> {
        let mut order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        let expected = order.status;
        let now = Utc::now();
        let mut events = Vec::new();
        for command in &commands {
            let emitted = order.execute(command, now).map_err(|e| {
                tracing::warn!(
                    order_id = %order_id,
                    status = %order.status,
                    error = %e,
                    "Order command rejected"
                );
                e
            })?;
            events.extend(emitted);
        }

        if events.is_empty() {
            tracing::debug!(order_id = %order_id, "No changes to apply");
            return Ok(order);
        }

        match self.store.replace_order(&order, expected).await? {
            ReplaceOutcome::Replaced => {}
            ReplaceOutcome::Missing => {
                return Err(AppError::not_found(format!("Order {}", order_id)));
            }
            ReplaceOutcome::StatusChanged(current) => {
                tracing::warn!(
                    order_id = %order_id,
                    expected = %expected,
                    current = %current,
                    "Order update lost a race"
                );
                return Err(OrderError::ConcurrentStatusChange { expected, current }.into());
            }
        }

        for event in &events {
            tracing::debug!(
                order_id = %order_id,
                event_type = event.event_type(),
                "Applied order event"
            );
            if let OrderEvent::StatusChanged(change) = event {
                self.metrics.record_transition(change.to);
                tracing::info!(
                    order_id = %order_id,
                    order_number = order.order_number,
                    from = %change.from,
                    to = %change.to,
                    "Order status changed"
                );
            }
        }

        Ok(order)
    }

    async fn load_catalog(&self, lines: &[CartLine]) -> Result<CartCatalog, AppError> {
        let mut catalog = CartCatalog::default();

        if lines.iter().any(|l| matches!(l, CartLine::Pizza { .. })) {
            catalog.pizza_flavors = self.active_flavors(FlavorKind::Pizza).await?;
        }
        if lines.iter().any(|l| matches!(l, CartLine::Esfiha { .. })) {
            catalog.esfiha_flavors = self.active_flavors(FlavorKind::Esfiha).await?;
        }
        if lines.iter().any(|l| matches!(l, CartLine::Bebida { .. })) {
            catalog.products = self.store.list_products().await?;
        }

        Ok(catalog)
    }

    async fn active_flavors(&self, kind: FlavorKind) -> Result<Vec<Flavor>, AppError> {
        let mut flavors = self.store.list_flavors(kind).await?;
        flavors.retain(|f| f.active);
        Ok(flavors)
    }
}

impl CartLine {
    fn quantity(&self) -> i32 {
        match self {
            CartLine::Pizza { selection, .. } => selection.quantity,
            CartLine::Esfiha { quantity, .. } | CartLine::Bebida { quantity, .. } => *quantity,
        }
    }
}

/// Scheduled orders need a datetime strictly after `now`; others carry none.
fn validate_schedule(
    is_scheduled: bool,
    scheduled_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, OrderError> {
    if !is_scheduled {
        return Ok(None);
    }
    let at = scheduled_at.ok_or(OrderError::MissingSchedule)?;
    if at <= now {
        return Err(OrderError::ScheduleInPast);
    }
    Ok(Some(at))
}

fn build_item(line: CartLine, catalog: &CartCatalog) -> Result<(OrderItem, StockRequirement), AppError> {
    match line {
        CartLine::Pizza { selection, observations } => build_pizza(selection, observations, catalog),

        CartLine::Esfiha { flavor_id, quantity, observations } => {
            let flavor = catalog
                .esfiha_flavors
                .iter()
                .find(|f| f.id == flavor_id)
                .ok_or_else(|| AppError::validation(format!("Unknown esfiha flavor: {}", flavor_id)))?;

            let item = OrderItem {
                id: Uuid::new_v4(),
                item_type: ItemType::Esfiha,
                product_id: Some(flavor.id),
                product_name: format!("Esfiha {}", flavor.name),
                quantity,
                unit_price: flavor.price,
                total_price: line_total(flavor.price, quantity).map_err(total_out_of_range)?,
                pizza_details: None,
                observations,
            };
            Ok((item, dough_requirement(DoughType::Esfiha, quantity)))
        }

        CartLine::Bebida { product_id, quantity, observations } => {
            let product = catalog
                .products
                .iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| AppError::validation(format!("Unknown product: {}", product_id)))?;
            if product.category != ProductCategory::Bebida || product.dough_type.is_some() {
                return Err(AppError::validation(format!("{} is not a beverage", product.name)));
            }

            let item = OrderItem {
                id: Uuid::new_v4(),
                item_type: ItemType::Bebida,
                product_id: Some(product.id),
                product_name: product.name.clone(),
                quantity,
                unit_price: product.price,
                total_price: line_total(product.price, quantity).map_err(total_out_of_range)?,
                pizza_details: None,
                observations,
            };
            let requirement = StockRequirement {
                counter: StockCounter::Product(product.id),
                quantity,
            };
            Ok((item, requirement))
        }
    }
}

fn build_pizza(
    selection: PizzaSelection,
    observations: Option<String>,
    catalog: &CartCatalog,
) -> Result<(OrderItem, StockRequirement), AppError> {
    let extras = selection
        .extras
        .into_iter()
        .map(|extra| -> Result<PizzaExtra, PricingError> {
            let menu = find_extra(&extra.name).ok_or(PricingError::UnknownExtra(extra.name))?;
            Ok(PizzaExtra {
                name: menu.name.to_string(),
                price: menu.price,
                placement: extra.placement,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let config = PizzaConfiguration {
        format: selection.format,
        size: selection.size,
        flavor_ids: selection.flavor_ids,
        border: selection.border,
        extras,
        quantity: selection.quantity,
    };
    let quote = price_pizza(&config, &catalog.pizza_flavors)?;

    let item = OrderItem {
        id: Uuid::new_v4(),
        item_type: ItemType::Pizza,
        product_id: None,
        product_name: format!("Pizza {} ({})", config.size.label(), quote.flavor_names.join(" / ")),
        quantity: config.quantity,
        unit_price: quote.unit_price,
        total_price: quote.total_price,
        pizza_details: Some(config),
        observations,
    };
    let requirement = dough_requirement(DoughType::Pizza, item.quantity);
    Ok((item, requirement))
}

/// Beverage and esfiha totals are not pizza configurations; report overflow plainly.
fn total_out_of_range(error: PricingError) -> AppError {
    AppError::validation(error.to_string())
}

fn dough_requirement(dough: DoughType, quantity: i32) -> StockRequirement {
    StockRequirement {
        counter: StockCounter::Dough(dough),
        quantity,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{
        DeliveryPerson, DeliveryPersonChanges, FlavorCategory, NewDeliveryPerson, NewFlavor,
        NewProduct, Transport,
    };
    use crate::domain::customer::{NewCustomer, PhoneNumber};
    use crate::domain::order::{ExtraSelection, OrderStatus};
    use crate::domain::pricing::{BorderType, ExtraPlacement, PizzaFormat, PizzaSize};
    use crate::store::{MemoryStore, OrderFilter};
    use chrono::Duration;
    use rust_decimal::Decimal;

    struct Fixture {
        handler: OrderCommandHandler,
        store: Arc<MemoryStore>,
        metrics: Arc<Metrics>,
        rider: DeliveryPerson,
        margherita: Flavor,
        camarao: Flavor,
        carne: Flavor,
        coke: Product,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());

        let rider = store
            .create_delivery_person(NewDeliveryPerson {
                name: "João Silva".to_string(),
                transport: Transport::Moto,
                phone: Some("(11) 91234-5678".to_string()),
                active: true,
            })
            .await
            .unwrap();

        let flavor = |name: &str, category, cents| NewFlavor {
            name: name.to_string(),
            category,
            price: Decimal::new(cents, 2),
            active: true,
        };
        let margherita = store
            .create_flavor(FlavorKind::Pizza, flavor("Margherita", FlavorCategory::Tradicional, 2500))
            .await
            .unwrap();
        let camarao = store
            .create_flavor(FlavorKind::Pizza, flavor("Camarão", FlavorCategory::Especial, 3200))
            .await
            .unwrap();
        let carne = store
            .create_flavor(FlavorKind::Esfiha, flavor("Carne", FlavorCategory::Tradicional, 250))
            .await
            .unwrap();

        let coke = store
            .create_product(NewProduct {
                name: "Coca-Cola Lata".to_string(),
                category: ProductCategory::Bebida,
                price: Decimal::new(350, 2),
                description: None,
                stock_quantity: 5,
                dough_type: None,
            })
            .await
            .unwrap();
        store
            .create_product(NewProduct {
                name: "Massa de Pizza".to_string(),
                category: ProductCategory::PizzaTradicional,
                price: Decimal::ZERO,
                description: None,
                stock_quantity: 10,
                dough_type: Some(DoughType::Pizza),
            })
            .await
            .unwrap();

        let handler = OrderCommandHandler::new(store.clone(), metrics.clone());
        Fixture { handler, store, metrics, rider, margherita, camarao, carne, coke }
    }

    impl Fixture {
        fn half_and_half(&self) -> CartLine {
            CartLine::Pizza {
                selection: PizzaSelection {
                    format: PizzaFormat::MeiaMeia,
                    size: PizzaSize::Grande,
                    flavor_ids: vec![self.margherita.id, self.camarao.id],
                    border: Some(BorderType::Catupiry),
                    extras: vec![ExtraSelection {
                        name: "Bacon".to_string(),
                        placement: ExtraPlacement::Toda,
                    }],
                    quantity: 1,
                },
                observations: None,
            }
        }

        fn cokes(&self, quantity: i32) -> CartLine {
            CartLine::Bebida { product_id: self.coke.id, quantity, observations: None }
        }

        fn place_order(&self, lines: Vec<CartLine>) -> PlaceOrder {
            PlaceOrder {
                customer: NewCustomer {
                    name: "Maria".to_string(),
                    phone: PhoneNumber::new("(11) 99999-0000"),
                    address: "Rua das Flores, 10".to_string(),
                    complement: None,
                },
                delivery_person_id: Some(self.rider.id),
                lines,
                observations: None,
                is_scheduled: false,
                scheduled_at: None,
            }
        }

        async fn stock_of(&self, id: Uuid) -> i32 {
            self.store.get_product(id).await.unwrap().unwrap().stock_quantity
        }

        async fn order_count(&self) -> usize {
            self.store.list_orders(&OrderFilter::default()).await.unwrap().len()
        }
    }

    #[tokio::test]
    async fn test_place_prices_mixed_cart_and_decrements_stock() {
        let fx = fixture().await;
        let command = fx.place_order(vec![
            fx.half_and_half(),
            CartLine::Esfiha { flavor_id: fx.carne.id, quantity: 4, observations: None },
            fx.cokes(2),
        ]);

        let order = fx.handler.place(command).await.unwrap();

        assert_eq!(order.order_number, 1);
        assert_eq!(order.status, OrderStatus::NotStarted);
        assert_eq!(order.items.len(), 3);
        assert_eq!(order.items[0].product_name, "Pizza Grande (Margherita / Camarão)");
        assert_eq!(order.items[0].total_price, Decimal::new(3600, 2));
        assert_eq!(order.items[1].product_name, "Esfiha Carne");
        assert_eq!(order.items[1].total_price, Decimal::new(1000, 2));
        assert_eq!(order.items[2].total_price, Decimal::new(700, 2));
        assert_eq!(order.total_price, Decimal::new(5300, 2));
        assert_eq!(order.total_price, order.items.iter().map(|i| i.total_price).sum());

        assert_eq!(fx.stock_of(fx.coke.id).await, 3);
        assert_eq!(fx.metrics.orders_created.get(), 1);
        assert_eq!(fx.metrics.order_value_cents.get(), 5300);
    }

    #[tokio::test]
    async fn test_empty_order_rejected_before_any_write() {
        let fx = fixture().await;

        let err = fx.handler.place(fx.place_order(vec![])).await.unwrap_err();

        assert!(matches!(err, AppError::Order(OrderError::EmptyItems)));
        assert_eq!(fx.order_count().await, 0);
        assert!(fx.store.list_customers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_line_quantities_rejected() {
        let fx = fixture().await;
        let command = fx.place_order(vec![fx.cokes(i32::MAX), fx.cokes(1)]);

        let err = fx.handler.place(command).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(msg) if msg.contains("too large")));
        assert_eq!(fx.order_count().await, 0);
        assert_eq!(fx.stock_of(fx.coke.id).await, 5);
    }

    #[tokio::test]
    async fn test_unrepresentable_total_rejected() {
        let fx = fixture().await;
        let gold = fx
            .store
            .create_product(NewProduct {
                name: "Champagne".to_string(),
                category: ProductCategory::Bebida,
                price: Decimal::MAX,
                description: None,
                stock_quantity: 5,
                dough_type: None,
            })
            .await
            .unwrap();
        let command = fx.place_order(vec![CartLine::Bebida {
            product_id: gold.id,
            quantity: 2,
            observations: None,
        }]);

        let err = fx.handler.place(command).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(fx.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_customer_name_rejected() {
        let fx = fixture().await;
        let mut command = fx.place_order(vec![fx.cokes(1)]);
        command.customer.name = "  ".to_string();

        assert!(matches!(fx.handler.place(command).await, Err(AppError::Validation(_))));
        assert_eq!(fx.stock_of(fx.coke.id).await, 5);
    }

    #[tokio::test]
    async fn test_schedule_rules() {
        let fx = fixture().await;
        let now = Utc::now();

        let mut missing = fx.place_order(vec![fx.cokes(1)]);
        missing.is_scheduled = true;
        assert!(matches!(
            fx.handler.place_at(missing, now).await,
            Err(AppError::Order(OrderError::MissingSchedule))
        ));

        let mut past = fx.place_order(vec![fx.cokes(1)]);
        past.is_scheduled = true;
        past.scheduled_at = Some(now - Duration::minutes(5));
        assert!(matches!(
            fx.handler.place_at(past, now).await,
            Err(AppError::Order(OrderError::ScheduleInPast))
        ));

        let mut future = fx.place_order(vec![fx.cokes(1)]);
        future.is_scheduled = true;
        future.scheduled_at = Some(now + Duration::hours(2));
        let order = fx.handler.place_at(future, now).await.unwrap();
        assert!(order.is_scheduled);
        assert_eq!(order.scheduled_at, Some(now + Duration::hours(2)));
    }

    #[tokio::test]
    async fn test_delivery_person_rules() {
        let fx = fixture().await;

        let mut missing = fx.place_order(vec![fx.cokes(1)]);
        missing.delivery_person_id = None;
        assert!(matches!(
            fx.handler.place(missing).await,
            Err(AppError::Order(OrderError::MissingDeliveryPerson))
        ));

        let mut unknown = fx.place_order(vec![fx.cokes(1)]);
        unknown.delivery_person_id = Some(Uuid::new_v4());
        assert!(matches!(fx.handler.place(unknown).await, Err(AppError::Validation(_))));

        fx.store
            .update_delivery_person(
                fx.rider.id,
                DeliveryPersonChanges { active: Some(false), ..Default::default() },
            )
            .await
            .unwrap();
        assert!(matches!(
            fx.handler.place(fx.place_order(vec![fx.cokes(1)])).await,
            Err(AppError::Order(OrderError::InactiveDeliveryPerson(_)))
        ));
        assert_eq!(fx.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_whole_order() {
        let fx = fixture().await;
        let command = fx.place_order(vec![fx.half_and_half(), fx.cokes(3), fx.cokes(3)]);

        let err = fx.handler.place(command).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::InsufficientStock { requested: 6, available: 5, .. }
        ));
        assert_eq!(fx.order_count().await, 0);
        assert_eq!(fx.stock_of(fx.coke.id).await, 5);
        assert_eq!(fx.metrics.stock_rejections.with_label_values(&["product"]).get(), 1);
        assert_eq!(fx.metrics.orders_created.get(), 0);
    }

    #[tokio::test]
    async fn test_unknown_extra_is_invalid_configuration() {
        let fx = fixture().await;
        let mut line = fx.half_and_half();
        if let CartLine::Pizza { selection, .. } = &mut line {
            selection.extras[0].name = "Abacaxi".to_string();
        }

        assert!(matches!(
            fx.handler.place(fx.place_order(vec![line])).await,
            Err(AppError::InvalidConfiguration(PricingError::UnknownExtra(_)))
        ));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let fx = fixture().await;

        assert!(matches!(
            fx.handler.place(fx.place_order(vec![fx.cokes(0)])).await,
            Err(AppError::Order(OrderError::InvalidQuantity(0)))
        ));
    }

    #[tokio::test]
    async fn test_order_numbers_strictly_increase() {
        let fx = fixture().await;

        let mut numbers = Vec::new();
        for _ in 0..3 {
            let order = fx.handler.place(fx.place_order(vec![fx.cokes(1)])).await.unwrap();
            numbers.push(order.order_number);
        }

        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_advance_through_workflow() {
        let fx = fixture().await;
        let order = fx.handler.place(fx.place_order(vec![fx.cokes(1)])).await.unwrap();

        for expected in [OrderStatus::InProgress, OrderStatus::Completed, OrderStatus::Delivered] {
            let advanced = fx.handler.handle(order.id, OrderCommand::Advance).await.unwrap();
            assert_eq!(advanced.status, expected);
        }

        let stored = fx.store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Delivered);
        assert!(stored.delivered_at.is_some());
        assert_eq!(fx.metrics.order_transitions.with_label_values(&["delivered"]).get(), 1);

        assert!(matches!(
            fx.handler.handle(order.id, OrderCommand::Advance).await,
            Err(AppError::Order(OrderError::AlreadyDelivered))
        ));
    }

    #[tokio::test]
    async fn test_rejected_update_stores_nothing() {
        let fx = fixture().await;
        let order = fx.handler.place(fx.place_order(vec![fx.cokes(1)])).await.unwrap();

        let err = fx
            .handler
            .update(
                order.id,
                OrderChanges {
                    status: Some(OrderStatus::Completed),
                    observations: Some("sem gelo".to_string()),
                    delivery_person_id: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Order(OrderError::InvalidStatusTransition { .. })));
        let stored = fx.store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.observations, None);
        assert_eq!(stored.status, OrderStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_update_reassigns_delivery_person() {
        let fx = fixture().await;
        let order = fx.handler.place(fx.place_order(vec![fx.cokes(1)])).await.unwrap();
        let maria = fx
            .store
            .create_delivery_person(NewDeliveryPerson {
                name: "Maria Santos".to_string(),
                transport: Transport::Bicicleta,
                phone: None,
                active: true,
            })
            .await
            .unwrap();

        let updated = fx
            .handler
            .update(
                order.id,
                OrderChanges {
                    status: Some(OrderStatus::InProgress),
                    observations: Some("troco para 50".to_string()),
                    delivery_person_id: Some(maria.id),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.delivery_person.id, maria.id);
        assert_eq!(updated.status, OrderStatus::InProgress);
        assert_eq!(updated.observations.as_deref(), Some("troco para 50"));
        assert_eq!(fx.store.get_order(order.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn test_handle_unknown_order() {
        let fx = fixture().await;
        assert!(matches!(
            fx.handler.handle(Uuid::new_v4(), OrderCommand::Advance).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_order() {
        let fx = fixture().await;
        let order = fx.handler.place(fx.place_order(vec![fx.cokes(1)])).await.unwrap();

        fx.handler.delete(order.id).await.unwrap();

        assert!(matches!(fx.handler.delete(order.id).await, Err(AppError::NotFound(_))));
        assert_eq!(fx.metrics.orders_deleted.get(), 1);
    }
}
