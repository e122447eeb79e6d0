use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregate::Aggregate;
use crate::domain::catalog::DeliveryPerson;
use crate::domain::customer::Customer;
use super::commands::OrderCommand;
use super::errors::OrderError;
use super::events::*;
use super::value_objects::{OrderItem, OrderStatus};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    // Identity
    pub id: Uuid,
    pub order_number: i64,

    // Current State
    pub customer: Customer,
    pub delivery_person: DeliveryPerson,
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,
    pub status: OrderStatus,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,

    // Optional fields
    pub observations: Option<String>,
    pub is_scheduled: bool,
    #[serde(rename = "scheduledDateTime")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Events for a single forward step from the current status to `to`.
    fn transition(&self, to: OrderStatus, now: DateTime<Utc>) -> Result<Vec<OrderEvent>, OrderError> {
        if self.status.next() != Some(to) {
            return Err(OrderError::InvalidStatusTransition {
                from: self.status,
                to,
            });
        }

        let mut events = vec![OrderEvent::StatusChanged(OrderStatusChanged {
            from: self.status,
            to,
            changed_at: now,
        })];
        if to == OrderStatus::Delivered {
            events.push(OrderEvent::Delivered(OrderDelivered { delivered_at: now }));
        }
        Ok(events)
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for Order {
    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    fn handle_command(
        &self,
        command: &Self::Command,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::Advance => {
                let to = self.status.next().ok_or(OrderError::AlreadyDelivered)?;
                self.transition(to, now)
            }

            OrderCommand::ChangeStatus { to } => {
                if *to == self.status {
                    return Ok(vec![]); // No change
                }
                self.transition(*to, now)
            }

            OrderCommand::UpdateObservations { observations } => {
                if &self.observations == observations {
                    return Ok(vec![]);
                }

                Ok(vec![OrderEvent::ObservationsUpdated(OrderObservationsUpdated {
                    observations: observations.clone(),
                    updated_at: now,
                })])
            }

            OrderCommand::AssignDeliveryPerson { delivery_person } => {
                if delivery_person.id == self.delivery_person.id {
                    return Ok(vec![]);
                }
                if !delivery_person.active {
                    return Err(OrderError::InactiveDeliveryPerson(delivery_person.id));
                }

                Ok(vec![OrderEvent::DeliveryPersonAssigned(OrderDeliveryPersonAssigned {
                    delivery_person: delivery_person.clone(),
                    assigned_at: now,
                })])
            }
        }
    }

    fn apply_event(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::StatusChanged(e) => {
                self.status = e.to;
                self.updated_at = e.changed_at;
            }
            OrderEvent::Delivered(e) => {
                self.delivered_at = Some(e.delivered_at);
            }
            OrderEvent::ObservationsUpdated(e) => {
                self.observations = e.observations.clone();
                self.updated_at = e.updated_at;
            }
            OrderEvent::DeliveryPersonAssigned(e) => {
                self.delivery_person = e.delivery_person.clone();
                self.updated_at = e.assigned_at;
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
