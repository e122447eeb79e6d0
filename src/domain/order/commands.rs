use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::catalog::DeliveryPerson;
use crate::domain::customer::NewCustomer;
use crate::domain::pricing::{BorderType, ExtraPlacement, PizzaFormat, PizzaSize};
use super::value_objects::OrderStatus;

// ============================================================================
// Order Commands - Represent operator intent
// ============================================================================

/// Commands against an existing order.
#[derive(Debug, Clone)]
pub enum OrderCommand {
    /// Move one step forward in the workflow.
    Advance,
    /// Move to an explicit status; only the next status is accepted.
    ChangeStatus { to: OrderStatus },
    UpdateObservations { observations: Option<String> },
    AssignDeliveryPerson { delivery_person: DeliveryPerson },
}

/// Submission of a new order from the intake screen.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub customer: NewCustomer,
    pub delivery_person_id: Option<Uuid>,
    pub lines: Vec<CartLine>,
    pub observations: Option<String>,
    pub is_scheduled: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub enum CartLine {
    Pizza {
        selection: PizzaSelection,
        observations: Option<String>,
    },
    Esfiha {
        flavor_id: Uuid,
        quantity: i32,
        observations: Option<String>,
    },
    Bebida {
        product_id: Uuid,
        quantity: i32,
        observations: Option<String>,
    },
}

/// Pizza as chosen by the operator; extras are named, priced server-side.
#[derive(Debug, Clone)]
pub struct PizzaSelection {
    pub format: PizzaFormat,
    pub size: PizzaSize,
    pub flavor_ids: Vec<Uuid>,
    pub border: Option<BorderType>,
    pub extras: Vec<ExtraSelection>,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct ExtraSelection {
    pub name: String,
    pub placement: ExtraPlacement,
}

/// Partial edit of an existing order from the dashboard.
///
/// Applied as one unit: observations, then delivery person, then status.
/// If any step is rejected nothing is stored.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub status: Option<OrderStatus>,
    pub observations: Option<String>,
    pub delivery_person_id: Option<Uuid>,
}
