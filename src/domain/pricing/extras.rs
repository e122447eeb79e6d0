use rust_decimal::Decimal;
use serde::Serialize;

// ============================================================================
// Extras Menu
// ============================================================================

/// Extra toppings offered on every pizza, priced in cents.
const EXTRAS_MENU: &[(&str, i64)] = &[
    ("Bacon", 400),
    ("Cream Cheese", 300),
    ("Azeitona", 200),
    ("Champignon", 300),
    ("Cebola Roxa", 200),
    ("Palmito", 400),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuExtra {
    pub name: &'static str,
    pub price: Decimal,
}

pub fn extras_menu() -> Vec<MenuExtra> {
    EXTRAS_MENU
        .iter()
        .map(|&(name, cents)| MenuExtra {
            name,
            price: Decimal::new(cents, 2),
        })
        .collect()
}

/// Look up an extra by name, ignoring case and surrounding whitespace.
pub fn find_extra(name: &str) -> Option<MenuExtra> {
    let wanted = name.trim();
    EXTRAS_MENU
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(wanted))
        .map(|&(name, cents)| MenuExtra {
            name,
            price: Decimal::new(cents, 2),
        })
}
