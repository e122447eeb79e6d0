use uuid::Uuid;

use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Cannot move order from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order changed while being updated: expected {expected}, found {current}")]
    ConcurrentStatusChange { expected: OrderStatus, current: OrderStatus },

    #[error("Order is already delivered")]
    AlreadyDelivered,

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Delivery person is required")]
    MissingDeliveryPerson,

    #[error("Delivery person is inactive: {0}")]
    InactiveDeliveryPerson(Uuid),

    #[error("Scheduled date/time is required for scheduled orders")]
    MissingSchedule,

    #[error("Scheduled date/time must be in the future")]
    ScheduleInPast,
}
