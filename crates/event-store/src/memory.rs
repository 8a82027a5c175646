use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Position, Result, Version,
    store::{AppendOptions, EventStore, validate_batch},
};

/// Event store held in process memory.
///
/// Used by the test suites and by the API when no `DATABASE_URL` is
/// configured. Behaves like the PostgreSQL store: atomic batches, version
/// checks, positions in append order.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored events.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

fn current_version(events: &[EventEnvelope], aggregate_id: AggregateId) -> Version {
    events
        .iter()
        .filter(|e| e.aggregate_id == aggregate_id)
        .map(|e| e.version)
        .max()
        .unwrap_or(Version::initial())
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_batch(&events)?;
        let aggregate_id = events[0].aggregate_id;
        let first_version = events[0].version;

        let mut store = self.events.write().await;
        let actual = current_version(&store, aggregate_id);

        if let Some(expected) = options.expected_version
            && actual != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual,
            });
        }

        if first_version != actual.next() {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(actual),
                actual,
            });
        }

        let mut last_version = actual;
        let mut next_position = store.len() as i64;
        for mut event in events {
            next_position += 1;
            event.position = Position::new(next_position);
            last_version = event.version;
            store.push(event);
        }

        Ok(last_version)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let store = self.events.read().await;
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let store = self.events.read().await;
        Ok(store
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .map(|e| e.version)
            .max())
    }

    async fn read_all(&self, after: Position, limit: usize) -> Result<Vec<EventEnvelope>> {
        let store = self.events.read().await;
        // Positions are 1-based indexes into the vector.
        let start = usize::try_from(after.as_i64()).unwrap_or(0).min(store.len());
        Ok(store.iter().skip(start).take(limit).cloned().collect())
    }

    async fn head_position(&self) -> Result<Position> {
        Ok(Position::new(self.events.read().await.len() as i64))
    }
}
