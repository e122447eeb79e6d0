use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::value_objects::DoughType;

// ============================================================================
// Stock Counters
// ============================================================================
//
// Beverages are gated by their own product row; pizzas and esfihas by the
// shared dough counter of their type. Check and decrement always happen
// together: callers never decrement a counter they did not just check.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StockCounter {
    Product(Uuid),
    Dough(DoughType),
}

impl fmt::Display for StockCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockCounter::Product(id) => write!(f, "product {}", id),
            StockCounter::Dough(dough) => write!(f, "massa de {}", dough.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRequirement {
    pub counter: StockCounter,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StockError {
    #[error("Insufficient stock: requested {requested}, available {available}")]
    Insufficient { requested: i32, available: i32 },

    #[error("Invalid stock quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Requested quantity for {counter} is too large")]
    QuantityOverflow { counter: StockCounter },
}

/// Validate a reduction and return the remaining quantity.
pub fn check_and_decrement(available: i32, requested: i32) -> Result<i32, StockError> {
    if requested <= 0 {
        return Err(StockError::InvalidQuantity(requested));
    }
    if requested > available {
        return Err(StockError::Insufficient { requested, available });
    }
    Ok(available - requested)
}

/// Sum requested quantities per counter, in a stable counter order.
///
/// Applying decrements in a fixed order keeps concurrent order submissions
/// from locking the same rows in opposite orders.
pub fn merge_requirements(
    requirements: impl IntoIterator<Item = StockRequirement>,
) -> Result<Vec<StockRequirement>, StockError> {
    let mut merged: BTreeMap<StockCounter, i32> = BTreeMap::new();
    for requirement in requirements {
        let total = merged.entry(requirement.counter).or_insert(0);
        *total = total
            .checked_add(requirement.quantity)
            .ok_or(StockError::QuantityOverflow { counter: requirement.counter })?;
    }
    Ok(merged
        .into_iter()
        .map(|(counter, quantity)| StockRequirement { counter, quantity })
        .collect())
}
