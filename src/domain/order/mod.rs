// ============================================================================
// Order Domain - Business Logic for the Order Aggregate
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderItem, OrderStatus, ItemType)
// - Events (OrderStatusChanged, OrderDelivered, ...)
// - Commands (PlaceOrder, OrderCommand, OrderChanges)
// - Errors (OrderError enum)
// - Aggregate (Order with the workflow rules)
// - Command Handler (OrderCommandHandler, talks to the Store)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
