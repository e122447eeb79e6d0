use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregate::DomainEvent;
use crate::domain::catalog::DeliveryPerson;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Events - facts produced by the workflow
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    StatusChanged(OrderStatusChanged),
    Delivered(OrderDelivered),
    ObservationsUpdated(OrderObservationsUpdated),
    DeliveryPersonAssigned(OrderDeliveryPersonAssigned),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::StatusChanged(_) => "OrderStatusChanged",
            OrderEvent::Delivered(_) => "OrderDelivered",
            OrderEvent::ObservationsUpdated(_) => "OrderObservationsUpdated",
            OrderEvent::DeliveryPersonAssigned(_) => "OrderDeliveryPersonAssigned",
        }
    }
}

/// Order moved one step along the kanban
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderStatusChanged {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_at: DateTime<Utc>,
}

/// Order handed to the customer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderDelivered {
    pub delivered_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderObservationsUpdated {
    pub observations: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderDeliveryPersonAssigned {
    pub delivery_person: DeliveryPerson,
    pub assigned_at: DateTime<Utc>,
}
