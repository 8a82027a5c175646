//! Command handling infrastructure.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// How many times a command is re-run after losing an optimistic-concurrency race.
pub const MAX_CONFLICT_RETRIES: usize = 5;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and persisted.
    pub events: Vec<A::Event>,

    /// The new version of the aggregate after the command.
    pub new_version: Version,
}

/// A request to change one aggregate.
pub trait Command: Send + Sync {
    /// The type of aggregate this command targets.
    type Aggregate: Aggregate;

    /// Returns the ID of the aggregate this command targets.
    fn aggregate_id(&self) -> AggregateId;
}

/// Loads aggregates from the store, runs command functions against them and
/// appends the resulting events with an expected version.
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replays a stream. A stream with no events yields `A::default()`; a
    /// stream of another aggregate type is not found.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let events = self.store.get_events_for_aggregate(aggregate_id).await?;

        let mut aggregate = A::default();
        for envelope in events {
            if envelope.aggregate_type != A::aggregate_type() {
                return Err(DomainError::not_found(A::aggregate_type(), aggregate_id));
            }
            let event: A::Event = envelope.decode()?;
            aggregate.apply(event);
            aggregate.set_version(envelope.version);
        }

        Ok(aggregate)
    }

    /// Loads an aggregate, returning None if it doesn't exist.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError> {
        match self.load(aggregate_id).await {
            Ok(aggregate) if aggregate.id().is_some() => Ok(Some(aggregate)),
            Ok(_) | Err(DomainError::AggregateNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Executes a command and persists the resulting events.
    ///
    /// The command function receives the current aggregate state and returns
    /// either a list of events to apply, or an error. An empty list persists
    /// nothing.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut aggregate = self.load(aggregate_id).await?;
        let current_version = aggregate.version();

        let events = command_fn(&aggregate)?;

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events: vec![],
                new_version: current_version,
            });
        }

        let envelopes = self.build_envelopes(aggregate_id, current_version, &events)?;
        let new_version = self
            .store
            .append(envelopes, AppendOptions::expect_version(current_version))
            .await?;

        for event in &events {
            aggregate.apply(event.clone());
        }
        aggregate.set_version(new_version);

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }

    /// Like [`execute`](Self::execute), but reloads and re-runs the command
    /// when another writer appended to the stream first.
    ///
    /// Used for streams with many independent writers, such as product stock
    /// and the daily order-number sequence.
    pub async fn execute_with_retry<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: Fn(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut attempt = 0;
        loop {
            match self.execute(aggregate_id, &command_fn).await {
                Err(err) if err.is_conflict() && attempt < MAX_CONFLICT_RETRIES => {
                    attempt += 1;
                    tracing::debug!(%aggregate_id, attempt, "retrying after concurrency conflict");
                    metrics::counter!("command_conflict_retries_total").increment(1);
                }
                result => return result,
            }
        }
    }

    fn build_envelopes(
        &self,
        aggregate_id: AggregateId,
        current_version: Version,
        events: &[A::Event],
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        let mut envelopes = Vec::with_capacity(events.len());
        let mut version = current_version;

        for event in events {
            version = version.next();
            envelopes.push(EventEnvelope::new(
                aggregate_id,
                A::aggregate_type(),
                event.event_type(),
                version,
                event,
            )?);
        }

        Ok(envelopes)
    }
}
