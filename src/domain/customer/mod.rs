// ============================================================================
// Customer Domain
// ============================================================================
//
// Customers are identified by phone number and upserted whenever an order
// is placed for them.
//
// ============================================================================

pub mod value_objects;
pub mod errors;

pub use value_objects::*;
pub use errors::*;
