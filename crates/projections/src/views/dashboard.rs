//! Admin dashboard read model.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use common::{AggregateId, Money};
use domain::{OrderEvent, OrderStatus};
use event_store::{EventEnvelope, Position};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, order_event};

/// Store-wide order figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub total_orders: u64,
    /// Every status, including those with no orders.
    pub orders_by_status: BTreeMap<String, u64>,
    /// Sum of order totals, excluding cancelled and refunded orders.
    pub revenue: Money,
    pub pending_refunds: u64,
}

#[derive(Debug, Clone, Copy)]
struct OrderFigures {
    status: OrderStatus,
    total: Money,
    refund_pending: bool,
}

#[derive(Default)]
struct DashboardState {
    orders: HashMap<AggregateId, OrderFigures>,
    position: Position,
}

#[derive(Clone, Default)]
pub struct DashboardView {
    state: Arc<RwLock<DashboardState>>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.read().await;
        let mut orders_by_status: BTreeMap<String, u64> = OrderStatus::ALL
            .iter()
            .map(|status| (status.as_str().to_string(), 0))
            .collect();
        let mut revenue = Money::zero();
        let mut pending_refunds = 0;

        for figures in state.orders.values() {
            *orders_by_status
                .entry(figures.status.as_str().to_string())
                .or_default() += 1;
            if !matches!(figures.status, OrderStatus::Cancelled | OrderStatus::Refunded) {
                revenue += figures.total;
            }
            if figures.refund_pending {
                pending_refunds += 1;
            }
        }

        DashboardSnapshot {
            total_orders: state.orders.len() as u64,
            orders_by_status,
            revenue,
            pending_refunds,
        }
    }
}

#[async_trait]
impl Projection for DashboardView {
    fn name(&self) -> &'static str {
        "DashboardView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let order_event = order_event(event)?;
        let order_id = event.aggregate_id;
        let mut state = self.state.write().await;

        match order_event {
            Some(OrderEvent::OrderPlaced(data)) => {
                state.orders.insert(
                    order_id,
                    OrderFigures {
                        status: OrderStatus::Pending,
                        total: data.totals.total,
                        refund_pending: false,
                    },
                );
            }
            Some(OrderEvent::OrderDiscarded(_)) => {
                state.orders.remove(&order_id);
            }
            Some(other) => {
                if let Some(figures) = state.orders.get_mut(&order_id) {
                    match other {
                        OrderEvent::StatusChanged(data) => figures.status = data.to,
                        OrderEvent::OrderCancelled(_) => figures.status = OrderStatus::Cancelled,
                        OrderEvent::RefundRequested(_) => figures.refund_pending = true,
                        OrderEvent::RefundApproved(_) => {
                            figures.status = OrderStatus::Refunded;
                            figures.refund_pending = false;
                        }
                        OrderEvent::RefundRejected(_) => figures.refund_pending = false,
                        _ => {}
                    }
                }
            }
            None => {}
        }

        state.position = event.position;
        Ok(())
    }

    async fn position(&self) -> Position {
        self.state.read().await.position
    }

    async fn reset(&self) -> Result<()> {
        *self.state.write().await = DashboardState::default();
        Ok(())
    }
}
