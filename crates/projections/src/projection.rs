//! Core projection trait.

use async_trait::async_trait;
use domain::{Aggregate, Order, OrderEvent};
use event_store::{EventEnvelope, Position};

use crate::Result;

/// A consumer of stored events: a read model or a reaction.
///
/// Each projection remembers the position of the last event it handled so
/// the processor can resume it after a restart or a failed event.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Handles a single event and advances the projection's position to it.
    async fn handle(&self, event: &EventEnvelope) -> Result<()>;

    /// Position of the last handled event.
    async fn position(&self) -> Position;

    /// Resets the projection to its initial state.
    async fn reset(&self) -> Result<()>;
}

/// Decodes an order event, or `None` for events of other aggregates.
pub(crate) fn order_event(event: &EventEnvelope) -> Result<Option<OrderEvent>> {
    if event.aggregate_type != Order::aggregate_type() {
        return Ok(None);
    }
    Ok(Some(event.decode()?))
}
