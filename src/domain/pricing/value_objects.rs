use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::catalog::FlavorCategory;

// ============================================================================
// Pizza Configuration Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PizzaFormat {
    #[serde(rename = "inteira")]
    Inteira,
    #[serde(rename = "meia-meia")]
    MeiaMeia,
}

impl PizzaFormat {
    /// Number of flavors this format takes.
    pub fn flavor_count(&self) -> usize {
        match self {
            PizzaFormat::Inteira => 1,
            PizzaFormat::MeiaMeia => 2,
        }
    }
}

impl fmt::Display for PizzaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PizzaFormat::Inteira => f.write_str("inteira"),
            PizzaFormat::MeiaMeia => f.write_str("meia-meia"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PizzaSize {
    Media,
    Grande,
}

impl PizzaSize {
    /// Multiplier applied to the base flavor price.
    pub fn factor(&self) -> Decimal {
        match self {
            PizzaSize::Media => Decimal::new(8, 1),
            PizzaSize::Grande => Decimal::ONE,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PizzaSize::Media => "Média",
            PizzaSize::Grande => "Grande",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderType {
    Requeijao,
    Catupiry,
    Cheddar,
    Chocolate,
}

impl BorderType {
    /// Border surcharge given the highest flavor category on the pizza.
    pub fn price_for(&self, category: FlavorCategory) -> Decimal {
        use FlavorCategory::*;
        match (self, category) {
            (BorderType::Requeijao, Tradicional) => Decimal::new(300, 2),
            (BorderType::Requeijao, Premium | Especial) => Decimal::ZERO,
            (BorderType::Catupiry | BorderType::Cheddar, Tradicional) => Decimal::new(800, 2),
            (BorderType::Catupiry | BorderType::Cheddar, Premium) => Decimal::new(500, 2),
            (BorderType::Catupiry | BorderType::Cheddar, Especial) => Decimal::ZERO,
            (BorderType::Chocolate, _) => Decimal::new(600, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraPlacement {
    Toda,
    Metade1,
    Metade2,
}

impl fmt::Display for ExtraPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraPlacement::Toda => f.write_str("toda"),
            ExtraPlacement::Metade1 => f.write_str("metade1"),
            ExtraPlacement::Metade2 => f.write_str("metade2"),
        }
    }
}

/// An extra topping with its flat price. Placement only labels it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PizzaExtra {
    pub name: String,
    pub price: Decimal,
    pub placement: ExtraPlacement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PizzaConfiguration {
    pub format: PizzaFormat,
    pub size: PizzaSize,
    pub flavor_ids: Vec<Uuid>,
    pub border: Option<BorderType>,
    #[serde(default)]
    pub extras: Vec<PizzaExtra>,
    pub quantity: i32,
}
