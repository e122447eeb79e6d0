use uuid::Uuid;

use super::value_objects::{ExtraPlacement, PizzaFormat};

// ============================================================================
// Pricing Errors - every variant is an invalid pizza configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("A {format} pizza takes exactly {expected} flavor(s), got {actual}")]
    FlavorCountMismatch {
        format: PizzaFormat,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown flavor: {0}")]
    UnknownFlavor(Uuid),

    #[error("Unknown extra: {0}")]
    UnknownExtra(String),

    #[error("Extra {name} selected twice for {placement}")]
    DuplicateExtra {
        name: String,
        placement: ExtraPlacement,
    },

    #[error("Invalid pizza quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Price exceeds the supported range")]
    PriceOverflow,
}
