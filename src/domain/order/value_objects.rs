use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::pricing::PizzaConfiguration;
use crate::domain::ParseVariantError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Kanban workflow state. Declaration order is workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    NotStarted,
    InProgress,
    Completed,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::NotStarted,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Delivered,
    ];

    /// The single status reachable from this one, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::NotStarted => Some(OrderStatus::InProgress),
            OrderStatus::InProgress => Some(OrderStatus::Completed),
            OrderStatus::Completed => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::NotStarted => "not-started",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseVariantError::new("order status", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Pizza,
    Esfiha,
    Bebida,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Pizza => "pizza",
            ItemType::Esfiha => "esfiha",
            ItemType::Bebida => "bebida",
        }
    }
}

impl FromStr for ItemType {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pizza" => Ok(ItemType::Pizza),
            "esfiha" => Ok(ItemType::Esfiha),
            "bebida" => Ok(ItemType::Bebida),
            other => Err(ParseVariantError::new("item type", other)),
        }
    }
}

/// A priced order line. Names and prices are copied from the catalog at
/// creation time and never re-derived.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub pizza_details: Option<PizzaConfiguration>,
    pub observations: Option<String>,
}

// ============================================================================
// Unit Tests
// ============================================================================
