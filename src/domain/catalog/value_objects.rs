use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::ParseVariantError;

// ============================================================================
// Catalog Value Objects
// ============================================================================

/// Flavor tier. Ordered: tradicional < premium < especial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlavorCategory {
    Tradicional,
    Premium,
    Especial,
}

impl FlavorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlavorCategory::Tradicional => "tradicional",
            FlavorCategory::Premium => "premium",
            FlavorCategory::Especial => "especial",
        }
    }
}

impl FromStr for FlavorCategory {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tradicional" => Ok(FlavorCategory::Tradicional),
            "premium" => Ok(FlavorCategory::Premium),
            "especial" => Ok(FlavorCategory::Especial),
            other => Err(ParseVariantError::new("flavor category", other)),
        }
    }
}

/// Which flavor table a flavor lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlavorKind {
    Pizza,
    Esfiha,
}

impl FlavorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlavorKind::Pizza => "pizza",
            FlavorKind::Esfiha => "esfiha",
        }
    }
}

impl fmt::Display for FlavorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pizza or esfiha flavor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flavor {
    pub id: Uuid,
    pub name: String,
    pub category: FlavorCategory,
    pub price: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFlavor {
    pub name: String,
    pub category: FlavorCategory,
    pub price: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlavorChanges {
    pub name: Option<String>,
    pub category: Option<FlavorCategory>,
    pub price: Option<Decimal>,
    pub active: Option<bool>,
}

impl Flavor {
    pub fn apply(&mut self, changes: FlavorChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    #[serde(rename = "pizza-tradicional")]
    PizzaTradicional,
    #[serde(rename = "pizza-premium")]
    PizzaPremium,
    #[serde(rename = "pizza-especial")]
    PizzaEspecial,
    #[serde(rename = "esfiha-tradicional")]
    EsfihaTradicional,
    #[serde(rename = "esfiha-premium")]
    EsfihaPremium,
    #[serde(rename = "esfiha-especial")]
    EsfihaEspecial,
    #[serde(rename = "bebida")]
    Bebida,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::PizzaTradicional => "pizza-tradicional",
            ProductCategory::PizzaPremium => "pizza-premium",
            ProductCategory::PizzaEspecial => "pizza-especial",
            ProductCategory::EsfihaTradicional => "esfiha-tradicional",
            ProductCategory::EsfihaPremium => "esfiha-premium",
            ProductCategory::EsfihaEspecial => "esfiha-especial",
            ProductCategory::Bebida => "bebida",
        }
    }
}

impl FromStr for ProductCategory {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pizza-tradicional" => Ok(ProductCategory::PizzaTradicional),
            "pizza-premium" => Ok(ProductCategory::PizzaPremium),
            "pizza-especial" => Ok(ProductCategory::PizzaEspecial),
            "esfiha-tradicional" => Ok(ProductCategory::EsfihaTradicional),
            "esfiha-premium" => Ok(ProductCategory::EsfihaPremium),
            "esfiha-especial" => Ok(ProductCategory::EsfihaEspecial),
            "bebida" => Ok(ProductCategory::Bebida),
            other => Err(ParseVariantError::new("product category", other)),
        }
    }
}

/// Item types that share a dough (massa) counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoughType {
    Pizza,
    Esfiha,
}

impl DoughType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoughType::Pizza => "pizza",
            DoughType::Esfiha => "esfiha",
        }
    }
}

impl FromStr for DoughType {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pizza" => Ok(DoughType::Pizza),
            "esfiha" => Ok(DoughType::Esfiha),
            other => Err(ParseVariantError::new("dough type", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: ProductCategory,
    pub price: Decimal,
    pub description: Option<String>,
    pub in_stock: bool,
    pub stock_quantity: i32,
    pub dough_type: Option<DoughType>,
}

impl Product {
    /// Set the stock level, keeping `in_stock` consistent with it.
    pub fn set_stock(&mut self, quantity: i32) {
        self.stock_quantity = quantity.max(0);
        self.in_stock = self.stock_quantity > 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub category: ProductCategory,
    pub price: Decimal,
    pub description: Option<String>,
    pub stock_quantity: i32,
    pub dough_type: Option<DoughType>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category: Option<ProductCategory>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub stock_quantity: Option<i32>,
}

impl Product {
    pub fn apply(&mut self, changes: ProductChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(quantity) = changes.stock_quantity {
            self.set_stock(quantity);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Pe,
    Bicicleta,
    Moto,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Pe => "pe",
            Transport::Bicicleta => "bicicleta",
            Transport::Moto => "moto",
        }
    }
}

impl FromStr for Transport {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pe" => Ok(Transport::Pe),
            "bicicleta" => Ok(Transport::Bicicleta),
            "moto" => Ok(Transport::Moto),
            other => Err(ParseVariantError::new("transport", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPerson {
    pub id: Uuid,
    pub name: String,
    pub transport: Transport,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDeliveryPerson {
    pub name: String,
    pub transport: Transport,
    pub phone: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryPersonChanges {
    pub name: Option<String>,
    pub transport: Option<Transport>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

impl DeliveryPerson {
    pub fn apply(&mut self, changes: DeliveryPersonChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(transport) = changes.transport {
            self.transport = transport;
        }
        if let Some(phone) = changes.phone {
            self.phone = Some(phone);
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
