use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::domain::catalog::{Flavor, FlavorCategory};
use crate::domain::order::OrderItem;
use super::errors::PricingError;
use super::value_objects::{BorderType, PizzaConfiguration};

// ============================================================================
// Pizza Price Computation
// ============================================================================
//
// unit  = max(flavor prices) * size factor + border(highest category) + extras
// total = unit * quantity
//
// All arithmetic stays in Decimal at full precision.
//
// ============================================================================

/// Result of pricing one pizza configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PizzaQuote {
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub highest_category: FlavorCategory,
    pub flavor_names: Vec<String>,
}

pub fn price_pizza(
    config: &PizzaConfiguration,
    catalog: &[Flavor],
) -> Result<PizzaQuote, PricingError> {
    let expected = config.format.flavor_count();
    if config.flavor_ids.len() != expected {
        return Err(PricingError::FlavorCountMismatch {
            format: config.format,
            expected,
            actual: config.flavor_ids.len(),
        });
    }
    if config.quantity < 1 {
        return Err(PricingError::InvalidQuantity(config.quantity));
    }

    let mut selected = Vec::with_capacity(expected);
    for id in &config.flavor_ids {
        let flavor = catalog
            .iter()
            .find(|f| f.id == *id)
            .ok_or(PricingError::UnknownFlavor(*id))?;
        selected.push(flavor);
    }

    let mut seen = HashSet::new();
    for extra in &config.extras {
        if !seen.insert((extra.name.as_str(), extra.placement)) {
            return Err(PricingError::DuplicateExtra {
                name: extra.name.clone(),
                placement: extra.placement,
            });
        }
    }

    // Flavor count was checked above, so `selected` is non-empty.
    let base = selected
        .iter()
        .map(|f| f.price)
        .max()
        .unwrap_or(Decimal::ZERO);
    let highest_category = selected
        .iter()
        .map(|f| f.category)
        .max()
        .unwrap_or(FlavorCategory::Tradicional);

    let extras = checked_sum(config.extras.iter().map(|e| e.price))?;
    let unit_price = base
        .checked_mul(config.size.factor())
        .and_then(|sized| sized.checked_add(border_price(config.border, highest_category)))
        .and_then(|priced| priced.checked_add(extras))
        .ok_or(PricingError::PriceOverflow)?;

    Ok(PizzaQuote {
        unit_price,
        total_price: line_total(unit_price, config.quantity)?,
        highest_category,
        flavor_names: selected.iter().map(|f| f.name.clone()).collect(),
    })
}

pub fn border_price(border: Option<BorderType>, highest: FlavorCategory) -> Decimal {
    border.map_or(Decimal::ZERO, |b| b.price_for(highest))
}

pub fn line_total(unit_price: Decimal, quantity: i32) -> Result<Decimal, PricingError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or(PricingError::PriceOverflow)
}

/// Sum of item totals over a heterogeneous cart.
pub fn cart_total<'a>(
    items: impl IntoIterator<Item = &'a OrderItem>,
) -> Result<Decimal, PricingError> {
    checked_sum(items.into_iter().map(|item| item.total_price))
}

fn checked_sum(prices: impl IntoIterator<Item = Decimal>) -> Result<Decimal, PricingError> {
    prices.into_iter().try_fold(Decimal::ZERO, |acc, price| {
        acc.checked_add(price).ok_or(PricingError::PriceOverflow)
    })
}

// ============================================================================
// Unit Tests
// ============================================================================
