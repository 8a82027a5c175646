use async_trait::async_trait;

use crate::{AggregateId, EventEnvelope, EventStoreError, Position, Result, Version};

/// Options for appending events to a stream.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Version the stream must be at for the append to succeed.
    /// `None` skips the check.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// The stream must not exist yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Storage for event streams.
///
/// Implementations must append a batch atomically and assign store-wide
/// positions in commit order, so a reader following [`EventStore::read_all`]
/// never skips an event.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends events to a single stream and returns the stream's new version.
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version>;

    /// Returns a stream's events in version order.
    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>>;

    /// Returns the current version of a stream, or `None` if it has no events.
    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;

    /// Returns up to `limit` events with a position strictly greater than `after`,
    /// in position order.
    async fn read_all(&self, after: Position, limit: usize) -> Result<Vec<EventEnvelope>>;

    /// Returns the position of the most recent event.
    async fn head_position(&self) -> Result<Position>;
}

/// Convenience methods available on every [`EventStore`].
#[async_trait]
pub trait EventStoreExt: EventStore {
    async fn append_event(&self, event: EventEnvelope, options: AppendOptions) -> Result<Version> {
        self.append(vec![event], options).await
    }

    async fn aggregate_exists(&self, aggregate_id: AggregateId) -> Result<bool> {
        Ok(self.get_aggregate_version(aggregate_id).await?.is_some())
    }
}

impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Checks that a batch targets one stream with consecutive versions.
pub(crate) fn validate_batch(events: &[EventEnvelope]) -> Result<()> {
    let Some(first) = events.first() else {
        return Err(EventStoreError::InvalidAppend(
            "cannot append an empty batch".to_string(),
        ));
    };

    let mut expected = first.version;
    for event in events.iter().skip(1) {
        if event.aggregate_id != first.aggregate_id || event.aggregate_type != first.aggregate_type
        {
            return Err(EventStoreError::InvalidAppend(
                "all events in a batch must belong to the same stream".to_string(),
            ));
        }
        expected = expected.next();
        if event.version != expected {
            return Err(EventStoreError::InvalidAppend(format!(
                "versions must be consecutive: expected {expected}, got {}",
                event.version
            )));
        }
    }

    Ok(())
}
