use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::catalog::{
    check_and_decrement, DeliveryPerson, DeliveryPersonChanges, Flavor, FlavorChanges, FlavorKind,
    NewDeliveryPerson, NewFlavor, NewProduct, Product, ProductChanges, StockCounter,
};
use crate::domain::customer::{Customer, PhoneNumber};
use crate::domain::order::{Order, OrderStatus};
use crate::error::AppError;
use super::{NewOrder, OrderFilter, ReplaceOutcome, Store, StoreResult};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// All state sits behind one async mutex, so every trait method is a single
// critical section. That gives the same all-or-nothing behaviour the
// PostgreSQL store gets from transactions.
//
// ============================================================================

#[derive(Default)]
struct MemoryState {
    products: Vec<Product>,
    pizza_flavors: Vec<Flavor>,
    esfiha_flavors: Vec<Flavor>,
    delivery_persons: Vec<DeliveryPerson>,
    customers: Vec<Customer>,
    orders: Vec<Order>,
    last_order_number: i64,
}

impl MemoryState {
    fn flavors(&self, kind: FlavorKind) -> &Vec<Flavor> {
        match kind {
            FlavorKind::Pizza => &self.pizza_flavors,
            FlavorKind::Esfiha => &self.esfiha_flavors,
        }
    }

    fn flavors_mut(&mut self, kind: FlavorKind) -> &mut Vec<Flavor> {
        match kind {
            FlavorKind::Pizza => &mut self.pizza_flavors,
            FlavorKind::Esfiha => &mut self.esfiha_flavors,
        }
    }

    fn counter_index(&self, counter: StockCounter) -> Option<usize> {
        match counter {
            StockCounter::Product(id) => self.products.iter().position(|p| p.id == id),
            StockCounter::Dough(dough) => self
                .products
                .iter()
                .position(|p| p.dough_type == Some(dough)),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.state.lock().await.products.clone())
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let state = self.state.lock().await;
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let mut state = self.state.lock().await;
        if let Some(dough) = product.dough_type {
            if state.products.iter().any(|p| p.dough_type == Some(dough)) {
                return Err(AppError::validation(format!(
                    "A dough counter for {} already exists",
                    dough.as_str()
                )));
            }
        }

        let mut created = Product {
            id: Uuid::new_v4(),
            name: product.name,
            category: product.category,
            price: product.price,
            description: product.description,
            in_stock: false,
            stock_quantity: 0,
            dough_type: product.dough_type,
        };
        created.set_stock(product.stock_quantity);
        state.products.push(created.clone());
        Ok(created)
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> StoreResult<Option<Product>> {
        let mut state = self.state.lock().await;
        Ok(state.products.iter_mut().find(|p| p.id == id).map(|product| {
            product.apply(changes);
            product.clone()
        }))
    }

    async fn reduce_stock(&self, id: Uuid, quantity: i32) -> StoreResult<Product> {
        let mut state = self.state.lock().await;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;

        let remaining = check_and_decrement(product.stock_quantity, quantity)
            .map_err(|e| AppError::from_stock(StockCounter::Product(id), e))?;
        product.set_stock(remaining);
        Ok(product.clone())
    }

    async fn list_flavors(&self, kind: FlavorKind) -> StoreResult<Vec<Flavor>> {
        Ok(self.state.lock().await.flavors(kind).clone())
    }

    async fn create_flavor(&self, kind: FlavorKind, flavor: NewFlavor) -> StoreResult<Flavor> {
        let created = Flavor {
            id: Uuid::new_v4(),
            name: flavor.name,
            category: flavor.category,
            price: flavor.price,
            active: flavor.active,
        };
        self.state.lock().await.flavors_mut(kind).push(created.clone());
        Ok(created)
    }

    async fn update_flavor(
        &self,
        kind: FlavorKind,
        id: Uuid,
        changes: FlavorChanges,
    ) -> StoreResult<Option<Flavor>> {
        let mut state = self.state.lock().await;
        Ok(state.flavors_mut(kind).iter_mut().find(|f| f.id == id).map(|flavor| {
            flavor.apply(changes);
            flavor.clone()
        }))
    }

    async fn list_delivery_persons(&self) -> StoreResult<Vec<DeliveryPerson>> {
        Ok(self.state.lock().await.delivery_persons.clone())
    }

    async fn get_delivery_person(&self, id: Uuid) -> StoreResult<Option<DeliveryPerson>> {
        let state = self.state.lock().await;
        Ok(state.delivery_persons.iter().find(|d| d.id == id).cloned())
    }

    async fn create_delivery_person(&self, person: NewDeliveryPerson) -> StoreResult<DeliveryPerson> {
        let created = DeliveryPerson {
            id: Uuid::new_v4(),
            name: person.name,
            transport: person.transport,
            phone: person.phone,
            active: person.active,
            created_at: Utc::now(),
        };
        self.state.lock().await.delivery_persons.push(created.clone());
        Ok(created)
    }

    async fn update_delivery_person(
        &self,
        id: Uuid,
        changes: DeliveryPersonChanges,
    ) -> StoreResult<Option<DeliveryPerson>> {
        let mut state = self.state.lock().await;
        Ok(state.delivery_persons.iter_mut().find(|d| d.id == id).map(|person| {
            person.apply(changes);
            person.clone()
        }))
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.state.lock().await.customers.clone())
    }

    async fn find_customer_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<Customer>> {
        let state = self.state.lock().await;
        Ok(state.customers.iter().find(|c| &c.phone == phone).cloned())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.order_number.cmp(&a.order_number))
        });
        Ok(orders)
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let state = self.state.lock().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn create_order(&self, order: NewOrder) -> StoreResult<Order> {
        let mut state = self.state.lock().await;

        if !state
            .delivery_persons
            .iter()
            .any(|d| d.id == order.delivery_person.id)
        {
            return Err(AppError::validation(format!(
                "Unknown delivery person: {}",
                order.delivery_person.id
            )));
        }

        // Check every counter before touching any of them.
        let mut decrements = Vec::with_capacity(order.stock.len());
        for requirement in &order.stock {
            let Some(index) = state.counter_index(requirement.counter) else {
                match requirement.counter {
                    StockCounter::Product(id) => {
                        return Err(AppError::not_found(format!("Product {}", id)))
                    }
                    // No dough counter configured: not stock-gated.
                    StockCounter::Dough(_) => continue,
                }
            };
            let remaining = check_and_decrement(state.products[index].stock_quantity, requirement.quantity)
                .map_err(|e| AppError::from_stock(requirement.counter, e))?;
            decrements.push((index, remaining));
        }

        for (index, remaining) in decrements {
            state.products[index].set_stock(remaining);
        }

        let customer = match state
            .customers
            .iter_mut()
            .find(|c| c.phone == order.customer.phone)
        {
            Some(existing) => {
                order.customer.merge_into(existing);
                existing.clone()
            }
            None => {
                let created = Customer {
                    id: Uuid::new_v4(),
                    name: order.customer.name,
                    phone: order.customer.phone,
                    address: order.customer.address,
                    complement: order.customer.complement,
                };
                state.customers.push(created.clone());
                created
            }
        };

        state.last_order_number += 1;
        let created = Order {
            id: Uuid::now_v7(),
            order_number: state.last_order_number,
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
        };
        state.orders.push(created.clone());
        Ok(created)
    }

    async fn replace_order(&self, order: &Order, expected: OrderStatus) -> StoreResult<ReplaceOutcome> {
        let mut state = self.state.lock().await;
        match state.orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) if existing.status != expected => {
                Ok(ReplaceOutcome::StatusChanged(existing.status))
            }
            Some(existing) => {
                *existing = order.clone();
                Ok(ReplaceOutcome::Replaced)
            }
            None => Ok(ReplaceOutcome::Missing),
        }
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.orders.len();
        state.orders.retain(|o| o.id != id);
        Ok(state.orders.len() != before)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{
        merge_requirements, DoughType, ProductCategory, StockRequirement, Transport,
    };
    use crate::domain::customer::NewCustomer;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn beverage(stock: i32) -> NewProduct {
        NewProduct {
            name: "Coca-Cola Lata".to_string(),
            category: ProductCategory::Bebida,
            price: Decimal::new(350, 2),
            description: None,
            stock_quantity: stock,
            dough_type: None,
        }
    }

    fn dough(dough_type: DoughType, stock: i32) -> NewProduct {
        NewProduct {
            name: format!("Massa de {}", dough_type.as_str()),
            category: ProductCategory::Bebida,
            price: Decimal::ZERO,
            description: None,
            stock_quantity: stock,
            dough_type: Some(dough_type),
        }
    }

    async fn rider(store: &MemoryStore) -> DeliveryPerson {
        store
            .create_delivery_person(NewDeliveryPerson {
                name: "João Silva".to_string(),
                transport: Transport::Moto,
                phone: None,
                active: true,
            })
            .await
            .unwrap()
    }

    fn new_order(
        delivery_person: DeliveryPerson,
        phone: &str,
        stock: Vec<StockRequirement>,
    ) -> NewOrder {
        NewOrder {
            customer: NewCustomer {
                name: "Maria".to_string(),
                phone: PhoneNumber::new(phone),
                address: "Rua B, 2".to_string(),
                complement: None,
            },
            delivery_person,
            items: vec![],
            total_price: Decimal::ZERO,
            observations: None,
            is_scheduled: false,
            scheduled_at: None,
            stock: merge_requirements(stock).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_created_product_derives_in_stock() {
        let store = MemoryStore::new();
        let empty = store.create_product(beverage(0)).await.unwrap();
        let stocked = store.create_product(beverage(4)).await.unwrap();

        assert!(!empty.in_stock);
        assert!(stocked.in_stock);
    }

    #[tokio::test]
    async fn test_reduce_stock_to_zero_clears_in_stock() {
        let store = MemoryStore::new();
        let product = store.create_product(beverage(2)).await.unwrap();

        let reduced = store.reduce_stock(product.id, 2).await.unwrap();

        assert_eq!(reduced.stock_quantity, 0);
        assert!(!reduced.in_stock);
    }

    #[tokio::test]
    async fn test_reduce_stock_rejects_and_leaves_stock_untouched() {
        let store = MemoryStore::new();
        let product = store.create_product(beverage(1)).await.unwrap();

        let err = store.reduce_stock(product.id, 2).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientStock { requested: 2, available: 1, .. }
        ));

        let unchanged = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(unchanged.stock_quantity, 1);
        assert!(unchanged.in_stock);
    }

    #[tokio::test]
    async fn test_reduce_stock_unknown_product() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.reduce_stock(Uuid::new_v4(), 1).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reduction_of_last_unit_has_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let product = store.create_product(beverage(1)).await.unwrap();

        let attempts: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.reduce_stock(product.id, 1).await })
            })
            .collect();
        let results = futures_util::future::join_all(attempts).await;

        let successes = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
        let rejections = results
            .iter()
            .filter(|r| matches!(r, Ok(Err(AppError::InsufficientStock { .. }))))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(rejections, 1);

        let after = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 0);
    }

    #[tokio::test]
    async fn test_order_numbers_are_sequential() {
        let store = MemoryStore::new();
        let person = rider(&store).await;

        let first = store.create_order(new_order(person.clone(), "1", vec![])).await.unwrap();
        let second = store.create_order(new_order(person.clone(), "2", vec![])).await.unwrap();
        let third = store.create_order(new_order(person, "3", vec![])).await.unwrap();

        assert_eq!(
            vec![first.order_number, second.order_number, third.order_number],
            vec![1, 2, 3]
        );
        assert_eq!(first.status, OrderStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_failed_order_rolls_back_everything() {
        let store = MemoryStore::new();
        let person = rider(&store).await;
        let coke = store.create_product(beverage(5)).await.unwrap();
        store.create_product(dough(DoughType::Pizza, 1)).await.unwrap();

        let err = store
            .create_order(new_order(
                person.clone(),
                "1199",
                vec![
                    StockRequirement { counter: StockCounter::Product(coke.id), quantity: 2 },
                    StockRequirement { counter: StockCounter::Dough(DoughType::Pizza), quantity: 2 },
                ],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock { requested: 2, available: 1, .. }));

        // Nothing applied: no order, no customer, no decrement, no number consumed.
        assert!(store.list_orders(&OrderFilter::default()).await.unwrap().is_empty());
        assert!(store.list_customers().await.unwrap().is_empty());
        assert_eq!(store.get_product(coke.id).await.unwrap().unwrap().stock_quantity, 5);

        let next = store.create_order(new_order(person, "1199", vec![])).await.unwrap();
        assert_eq!(next.order_number, 1);
    }

    #[tokio::test]
    async fn test_missing_dough_counter_does_not_gate() {
        let store = MemoryStore::new();
        let person = rider(&store).await;

        let order = store
            .create_order(new_order(
                person,
                "1199",
                vec![StockRequirement { counter: StockCounter::Dough(DoughType::Esfiha), quantity: 10 }],
            ))
            .await;

        assert!(order.is_ok());
    }

    #[tokio::test]
    async fn test_customer_upserted_by_phone() {
        let store = MemoryStore::new();
        let person = rider(&store).await;

        let first = store.create_order(new_order(person.clone(), "1199", vec![])).await.unwrap();
        let mut again = new_order(person, "1199", vec![]);
        again.customer.address = "Rua Nova, 99".to_string();
        let second = store.create_order(again).await.unwrap();

        assert_eq!(first.customer.id, second.customer.id);
        let customers = store.list_customers().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].address, "Rua Nova, 99");
    }

    #[tokio::test]
    async fn test_delete_order() {
        let store = MemoryStore::new();
        let person = rider(&store).await;
        let order = store.create_order(new_order(person, "1", vec![])).await.unwrap();

        assert!(store.delete_order(order.id).await.unwrap());
        assert!(!store.delete_order(order.id).await.unwrap());
        assert!(store.get_order(order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_from_stale_copy_is_refused() {
        let store = MemoryStore::new();
        let person = rider(&store).await;
        let placed = store.create_order(new_order(person, "1", vec![])).await.unwrap();

        let mut current = placed.clone();
        current.status = OrderStatus::InProgress;
        assert_eq!(
            store.replace_order(&current, OrderStatus::NotStarted).await.unwrap(),
            ReplaceOutcome::Replaced
        );
        current.status = OrderStatus::Completed;
        assert_eq!(
            store.replace_order(&current, OrderStatus::InProgress).await.unwrap(),
            ReplaceOutcome::Replaced
        );

        let mut stale = placed;
        stale.status = OrderStatus::InProgress;
        assert_eq!(
            store.replace_order(&stale, OrderStatus::NotStarted).await.unwrap(),
            ReplaceOutcome::StatusChanged(OrderStatus::Completed)
        );
        let stored = store.get_order(current.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_replace_missing_order() {
        let store = MemoryStore::new();
        let person = rider(&store).await;
        let order = store.create_order(new_order(person, "1", vec![])).await.unwrap();
        store.delete_order(order.id).await.unwrap();

        assert_eq!(
            store.replace_order(&order, OrderStatus::NotStarted).await.unwrap(),
            ReplaceOutcome::Missing
        );
    }

    #[tokio::test]
    async fn test_duplicate_dough_counter_rejected() {
        let store = MemoryStore::new();
        store.create_product(dough(DoughType::Pizza, 10)).await.unwrap();

        assert!(matches!(
            store.create_product(dough(DoughType::Pizza, 5)).await,
            Err(AppError::Validation(_))
        ));
    }
}
