// ============================================================================
// Pricing Engine
// ============================================================================
//
// Pure price computation, no I/O:
// - Value objects (PizzaConfiguration and its parts)
// - Extras menu
// - Errors (PricingError, surfaced as an invalid configuration)
// - Engine (pizza price, border rule, cart totals)
//
// ============================================================================

pub mod value_objects;
pub mod extras;
pub mod errors;
pub mod engine;

pub use value_objects::*;
pub use extras::*;
pub use errors::*;
pub use engine::*;
