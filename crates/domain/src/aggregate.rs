//! Core aggregate and domain event traits.

use common::AggregateId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// A fact that happened to an aggregate. Named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name stored alongside the payload.
    fn event_type(&self) -> &'static str;
}

/// An event-sourced aggregate.
///
/// Aggregates are rebuilt by replaying their stream through [`Aggregate::apply`].
/// Command methods inspect the current state and return the events to append;
/// they never mutate `self`.
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors its command methods can produce.
    type Error: std::error::Error + Send + Sync;

    /// Stream kind, e.g. `"Order"`.
    fn aggregate_type() -> &'static str;

    /// Returns the stream id, or `None` for a stream with no events yet.
    fn id(&self) -> Option<AggregateId>;

    /// Version of the last applied event; 0 for a new aggregate.
    fn version(&self) -> Version;

    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate.
    ///
    /// Must be deterministic and infallible: the event has already happened.
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum CounterEvent {
        Opened { id: AggregateId },
        Incremented { by: u32 },
    }

    impl DomainEvent for CounterEvent {
        fn event_type(&self) -> &'static str {
            match self {
                CounterEvent::Opened { .. } => "CounterOpened",
                CounterEvent::Incremented { .. } => "CounterIncremented",
            }
        }
    }

    #[derive(Debug, Default)]
    struct Counter {
        id: Option<AggregateId>,
        total: u32,
        version: Version,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("counter error")]
    struct CounterError;

    impl Aggregate for Counter {
        type Event = CounterEvent;
        type Error = CounterError;

        fn aggregate_type() -> &'static str {
            "Counter"
        }

        fn id(&self) -> Option<AggregateId> {
            self.id
        }

        fn version(&self) -> Version {
            self.version
        }

        fn set_version(&mut self, version: Version) {
            self.version = version;
        }

        fn apply(&mut self, event: Self::Event) {
            match event {
                CounterEvent::Opened { id } => self.id = Some(id),
                CounterEvent::Incremented { by } => self.total += by,
            }
        }
    }

    #[test]
    fn apply_events_replays_in_order() {
        let id = AggregateId::new();
        let mut counter = Counter::default();
        counter.apply_events(vec![
            CounterEvent::Opened { id },
            CounterEvent::Incremented { by: 2 },
            CounterEvent::Incremented { by: 3 },
        ]);

        assert_eq!(counter.id(), Some(id));
        assert_eq!(counter.total, 5);
        assert_eq!(
            CounterEvent::Incremented { by: 1 }.event_type(),
            "CounterIncremented"
        );
    }
}
