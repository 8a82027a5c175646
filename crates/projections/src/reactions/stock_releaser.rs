//! Re-issues stock releases recorded on cancelled and discarded orders.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{InventoryAdjuster, OrderEvent};
use event_store::{EventEnvelope, Position};
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, order_event};

/// Releases are idempotent per reservation key, so replaying them after the
/// inline release only fills in what did not land. An error leaves the
/// position on the previous event and the processor retries it.
pub struct StockReleaser {
    inventory: Arc<dyn InventoryAdjuster>,
    position: RwLock<Position>,
}

impl StockReleaser {
    pub fn new(inventory: Arc<dyn InventoryAdjuster>) -> Self {
        Self {
            inventory,
            position: RwLock::new(Position::start()),
        }
    }
}

#[async_trait]
impl Projection for StockReleaser {
    fn name(&self) -> &'static str {
        "StockReleaser"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let releases = match order_event(event)? {
            Some(OrderEvent::OrderCancelled(data)) => data.releases,
            Some(OrderEvent::OrderDiscarded(data)) => data.releases,
            _ => vec![],
        };

        for release in &releases {
            self.inventory
                .release(release.product_id, &release.key)
                .await?;
        }
        if !releases.is_empty() {
            metrics::counter!("stock_releases_replayed_total").increment(releases.len() as u64);
            tracing::debug!(order_id = %event.aggregate_id, count = releases.len(), "stock releases confirmed");
        }

        *self.position.write().await = event.position;
        Ok(())
    }

    async fn position(&self) -> Position {
        *self.position.read().await
    }

    async fn reset(&self) -> Result<()> {
        *self.position.write().await = Position::start();
        Ok(())
    }
}
