use chrono::{DateTime, Utc};
use uuid::Uuid;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// Key Principles:
// 1. Commands are validated against current state before emitting events
// 2. Events represent facts that have already happened
// 3. Applying an event never fails business validation
// 4. All state changes flow through events
//
// The resulting state is persisted as a whole-record replace; events are not
// stored.
//
// ============================================================================

/// Generic aggregate trait for workflow-driven records.
pub trait Aggregate: Sized + Send + Sync {
    type Event: DomainEvent;
    type Command;
    type Error;

    /// Handle command and emit events (business logic)
    fn handle_command(
        &self,
        command: &Self::Command,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self::Event>, Self::Error>;

    /// Apply an event to update state
    fn apply_event(&mut self, event: &Self::Event);

    /// Get aggregate ID
    fn aggregate_id(&self) -> Uuid;

    /// Handle a command and fold the resulting events into `self`.
    fn execute(
        &mut self,
        command: &Self::Command,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle_command(command, now)?;
        for event in &events {
            self.apply_event(event);
        }
        Ok(events)
    }
}

/// Domain events carry a stable name for logs and metrics.
pub trait DomainEvent: Clone + Send + Sync {
    fn event_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum CounterEvent {
        Incremented,
    }

    impl DomainEvent for CounterEvent {
        fn event_type(&self) -> &'static str {
            "Incremented"
        }
    }

    struct Counter {
        id: Uuid,
        value: u32,
    }

    impl Aggregate for Counter {
        type Event = CounterEvent;
        type Command = u32;
        type Error = String;

        fn handle_command(&self, by: &u32, _now: DateTime<Utc>) -> Result<Vec<CounterEvent>, String> {
            if *by == 0 {
                return Err("nothing to do".to_string());
            }
            Ok(vec![CounterEvent::Incremented; *by as usize])
        }

        fn apply_event(&mut self, _event: &CounterEvent) {
            self.value += 1;
        }

        fn aggregate_id(&self) -> Uuid {
            self.id
        }
    }

    #[test]
    fn test_execute_applies_every_emitted_event() {
        let mut counter = Counter { id: Uuid::new_v4(), value: 0 };
        let events = counter.execute(&3, Utc::now()).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(counter.value, 3);
    }

    #[test]
    fn test_execute_leaves_state_untouched_on_rejection() {
        let mut counter = Counter { id: Uuid::new_v4(), value: 7 };
        assert!(counter.execute(&0, Utc::now()).is_err());
        assert_eq!(counter.value, 7);
    }
}
