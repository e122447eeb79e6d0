use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::catalog::{
    DeliveryPersonChanges, DoughType, FlavorCategory, FlavorChanges, NewDeliveryPerson, NewFlavor,
    NewProduct, ProductCategory, ProductChanges, Transport,
};
use crate::domain::customer::{NewCustomer, PhoneNumber};
use crate::domain::order::{
    CartLine, ExtraSelection, OrderChanges, OrderStatus, PizzaSelection, PlaceOrder,
};
use crate::domain::pricing::{BorderType, ExtraPlacement, PizzaFormat, PizzaSize};
use crate::error::AppError;

// ============================================================================
// Request Models
// ============================================================================
//
// Wire shapes accepted by the API. Each converts into a domain value via an
// `into_*` method that performs the boundary checks; handlers never pass
// raw request data further in.
//
// ============================================================================

fn required(field: &str, value: String) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn non_negative_price(price: Decimal) -> Result<Decimal, AppError> {
    if price.is_sign_negative() {
        return Err(AppError::validation("Price cannot be negative"));
    }
    Ok(price)
}

fn non_negative_stock(quantity: i32) -> Result<i32, AppError> {
    if quantity < 0 {
        return Err(AppError::validation("Stock quantity cannot be negative"));
    }
    Ok(quantity)
}

/// Empty strings clear optional text fields.
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ----------------------------------------------------------------------------
// Products
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub category: ProductCategory,
    pub price: Decimal,
    pub description: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    pub dough_type: Option<DoughType>,
}

impl CreateProductRequest {
    pub fn into_new_product(self) -> Result<NewProduct, AppError> {
        Ok(NewProduct {
            name: required("Name", self.name)?,
            category: self.category,
            price: non_negative_price(self.price)?,
            description: optional_text(self.description),
            stock_quantity: non_negative_stock(self.stock_quantity)?,
            dough_type: self.dough_type,
        })
    }
}

/// `inStock` is derived from the quantity and never accepted from clients.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<ProductCategory>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub stock_quantity: Option<i32>,
}

impl UpdateProductRequest {
    pub fn into_changes(self) -> Result<ProductChanges, AppError> {
        Ok(ProductChanges {
            name: self.name.map(|n| required("Name", n)).transpose()?,
            category: self.category,
            price: self.price.map(non_negative_price).transpose()?,
            description: self.description,
            stock_quantity: self.stock_quantity.map(non_negative_stock).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReduceStockRequest {
    pub quantity: i32,
}

// ----------------------------------------------------------------------------
// Flavors
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlavorRequest {
    pub name: String,
    pub category: FlavorCategory,
    pub price: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl CreateFlavorRequest {
    pub fn into_new_flavor(self) -> Result<NewFlavor, AppError> {
        Ok(NewFlavor {
            name: required("Name", self.name)?,
            category: self.category,
            price: non_negative_price(self.price)?,
            active: self.active,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlavorRequest {
    pub name: Option<String>,
    pub category: Option<FlavorCategory>,
    pub price: Option<Decimal>,
    pub active: Option<bool>,
}

impl UpdateFlavorRequest {
    pub fn into_changes(self) -> Result<FlavorChanges, AppError> {
        Ok(FlavorChanges {
            name: self.name.map(|n| required("Name", n)).transpose()?,
            category: self.category,
            price: self.price.map(non_negative_price).transpose()?,
            active: self.active,
        })
    }
}

// ----------------------------------------------------------------------------
// Delivery staff
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryPersonRequest {
    pub name: String,
    pub transport: Transport,
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl CreateDeliveryPersonRequest {
    pub fn into_new_delivery_person(self) -> Result<NewDeliveryPerson, AppError> {
        Ok(NewDeliveryPerson {
            name: required("Name", self.name)?,
            transport: self.transport,
            phone: optional_text(self.phone),
            active: self.active,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeliveryPersonRequest {
    pub name: Option<String>,
    pub transport: Option<Transport>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

impl UpdateDeliveryPersonRequest {
    pub fn into_changes(self) -> Result<DeliveryPersonChanges, AppError> {
        Ok(DeliveryPersonChanges {
            name: self.name.map(|n| required("Name", n)).transpose()?,
            transport: self.transport,
            phone: self.phone,
            active: self.active,
        })
    }
}

// ----------------------------------------------------------------------------
// Orders
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub complement: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer: CustomerRequest,
    pub delivery_person_id: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    pub observations: Option<String>,
    #[serde(default)]
    pub is_scheduled: bool,
    pub scheduled_date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrderItemRequest {
    Pizza(PizzaItemRequest),
    Esfiha(QuantityItemRequest),
    Bebida(QuantityItemRequest),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PizzaItemRequest {
    pub pizza_details: PizzaDetailsRequest,
    pub quantity: Option<i32>,
    pub observations: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PizzaDetailsRequest {
    pub format: PizzaFormat,
    pub size: PizzaSize,
    #[serde(alias = "flavors")]
    pub flavor_ids: Vec<Uuid>,
    pub border: Option<BorderType>,
    #[serde(default)]
    pub extras: Vec<ExtraRequest>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ExtraRequest {
    pub name: String,
    pub placement: ExtraPlacement,
}

/// Esfiha lines reference a flavor, bebida lines a product; both arrive as `productId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityItemRequest {
    #[serde(alias = "flavorId")]
    pub product_id: Uuid,
    pub quantity: i32,
    pub observations: Option<String>,
}

impl CreateOrderRequest {
    pub fn into_place_order(self) -> Result<PlaceOrder, AppError> {
        let scheduled_at = if self.is_scheduled {
            self.scheduled_date_time
                .as_deref()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(parse_schedule)
                .transpose()?
        } else {
            None
        };

        Ok(PlaceOrder {
            customer: NewCustomer {
                name: self.customer.name.trim().to_string(),
                phone: PhoneNumber::new(self.customer.phone),
                address: self.customer.address.trim().to_string(),
                complement: optional_text(self.customer.complement),
            },
            delivery_person_id: self.delivery_person_id,
            lines: self.items.into_iter().map(OrderItemRequest::into_cart_line).collect(),
            observations: optional_text(self.observations),
            is_scheduled: self.is_scheduled,
            scheduled_at,
        })
    }
}

impl OrderItemRequest {
    fn into_cart_line(self) -> CartLine {
        match self {
            OrderItemRequest::Pizza(item) => {
                let details = item.pizza_details;
                CartLine::Pizza {
                    selection: PizzaSelection {
                        format: details.format,
                        size: details.size,
                        flavor_ids: details.flavor_ids,
                        border: details.border,
                        extras: details
                            .extras
                            .into_iter()
                            .map(|e| ExtraSelection { name: e.name, placement: e.placement })
                            .collect(),
                        quantity: item.quantity.or(details.quantity).unwrap_or(1),
                    },
                    observations: optional_text(item.observations),
                }
            }
            OrderItemRequest::Esfiha(item) => CartLine::Esfiha {
                flavor_id: item.product_id,
                quantity: item.quantity,
                observations: optional_text(item.observations),
            },
            OrderItemRequest::Bebida(item) => CartLine::Bebida {
                product_id: item.product_id,
                quantity: item.quantity,
                observations: optional_text(item.observations),
            },
        }
    }
}

/// Accepts RFC 3339, or a zone-less `YYYY-MM-DDTHH:MM[:SS]` read as local time.
fn parse_schedule(value: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|_| AppError::validation(format!("Invalid scheduled date/time: {}", value)))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
        .ok_or_else(|| AppError::validation(format!("Invalid scheduled date/time: {}", value)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub observations: Option<String>,
    pub delivery_person_id: Option<Uuid>,
}

impl From<UpdateOrderRequest> for OrderChanges {
    fn from(request: UpdateOrderRequest) -> Self {
        OrderChanges {
            status: request.status,
            observations: request.observations,
            delivery_person_id: request.delivery_person_id,
        }
    }
}

// ----------------------------------------------------------------------------
// Queries
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_order_request_maps_lines() {
        let flavor = Uuid::new_v4();
        let coke = Uuid::new_v4();
        let request: CreateOrderRequest = serde_json::from_value(json!({
            "customer": { "name": " Maria ", "phone": "(11) 99999-0000", "address": "Rua B, 2" },
            "deliveryPersonId": Uuid::new_v4(),
            "items": [
                {
                    "type": "pizza",
                    "pizzaDetails": {
                        "format": "meia-meia",
                        "size": "grande",
                        "flavors": [flavor, flavor],
                        "border": "catupiry",
                        "extras": [{ "name": "Bacon", "placement": "metade1" }]
                    }
                },
                { "type": "esfiha", "productId": flavor, "quantity": 4 },
                { "type": "bebida", "productId": coke, "quantity": 2, "observations": "" }
            ]
        }))
        .unwrap();

        let command = request.into_place_order().unwrap();

        assert_eq!(command.customer.name, "Maria");
        assert_eq!(command.lines.len(), 3);
        match &command.lines[0] {
            CartLine::Pizza { selection, .. } => {
                assert_eq!(selection.format, PizzaFormat::MeiaMeia);
                assert_eq!(selection.quantity, 1);
                assert_eq!(selection.extras[0].placement, ExtraPlacement::Metade1);
            }
            other => panic!("expected pizza line, got {:?}", other),
        }
        assert!(matches!(
            command.lines[2],
            CartLine::Bebida { quantity: 2, observations: None, .. }
        ));
        assert!(!command.is_scheduled);
    }

    #[test]
    fn test_unknown_item_type_rejected() {
        let result = serde_json::from_value::<OrderItemRequest>(json!({
            "type": "sobremesa", "productId": Uuid::new_v4(), "quantity": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_schedule_parsing() {
        let utc = parse_schedule("2030-01-15T20:30:00Z").unwrap();
        assert_eq!(utc.to_rfc3339(), "2030-01-15T20:30:00+00:00");

        assert!(parse_schedule("2030-01-15T20:30").is_ok());
        assert!(matches!(parse_schedule("amanhã"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_invalid_schedule_surfaces_from_request() {
        let request: CreateOrderRequest = serde_json::from_value(json!({
            "customer": { "name": "Maria", "phone": "1199", "address": "Rua B, 2" },
            "items": [],
            "isScheduled": true,
            "scheduledDateTime": "not a date"
        }))
        .unwrap();

        assert!(matches!(request.into_place_order(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_product_validation() {
        let request: CreateProductRequest = serde_json::from_value(json!({
            "name": "Suco", "category": "bebida", "price": -1.0
        }))
        .unwrap();
        assert!(matches!(request.into_new_product(), Err(AppError::Validation(_))));

        let update: UpdateProductRequest = serde_json::from_value(json!({
            "stockQuantity": -3, "inStock": true
        }))
        .unwrap();
        assert!(matches!(update.into_changes(), Err(AppError::Validation(_))));
    }
}
