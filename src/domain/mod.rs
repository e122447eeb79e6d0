// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each area has its own subdirectory:
// - catalog   - products, flavors, delivery staff, stock counters
// - customer  - customer records keyed by phone
// - pricing   - pizza price computation and cart totals
// - order     - order aggregate, workflow commands/events, command handler
// - stats     - day summaries and delivery rankings
//
// Nothing here talks to the database directly; persistence goes through
// the `Store` trait in `crate::store`.
//
// ============================================================================

pub mod aggregate;
pub mod catalog;
pub mod customer;
pub mod pricing;
pub mod order;
pub mod stats;

/// Error raised when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseVariantError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
