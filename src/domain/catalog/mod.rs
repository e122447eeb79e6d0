// ============================================================================
// Catalog Domain
// ============================================================================
//
// - Value objects (Product, Flavor, DeliveryPerson and their enums)
// - Stock counters and the check-then-decrement rule
//
// ============================================================================

pub mod value_objects;
pub mod stock;

pub use value_objects::*;
pub use stock::*;
