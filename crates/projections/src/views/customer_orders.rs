//! Customer orders read model: order summaries per customer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AggregateId, CustomerId, Money};
use domain::{OrderEvent, OrderStatus};
use event_store::{EventEnvelope, Position};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, order_event};

/// One order in a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerOrderRow {
    pub order_id: AggregateId,
    pub order_number: String,
    pub customer_id: Option<CustomerId>,
    pub status: OrderStatus,
    pub total: Money,
    pub item_count: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct CustomerOrdersState {
    orders: HashMap<AggregateId, CustomerOrderRow>,
    by_customer: HashMap<CustomerId, Vec<AggregateId>>,
    position: Position,
}

/// Order listings per customer, newest first. Guest orders only appear in
/// [`CustomerOrdersView::all`]; discarded orders are dropped.
#[derive(Clone, Default)]
pub struct CustomerOrdersView {
    state: Arc<RwLock<CustomerOrdersState>>,
}

impl CustomerOrdersView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn orders_for(&self, customer_id: CustomerId) -> Vec<CustomerOrderRow> {
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .by_customer
            .get(&customer_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.orders.get(id).cloned())
            .collect();
        newest_first(&mut rows);
        rows
    }

    /// Every order, for administrators.
    pub async fn all(&self) -> Vec<CustomerOrderRow> {
        let mut rows: Vec<_> = self.state.read().await.orders.values().cloned().collect();
        newest_first(&mut rows);
        rows
    }

    pub async fn get(&self, order_id: AggregateId) -> Option<CustomerOrderRow> {
        self.state.read().await.orders.get(&order_id).cloned()
    }
}

fn newest_first(rows: &mut [CustomerOrderRow]) {
    rows.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.order_number.cmp(&a.order_number))
    });
}

#[async_trait]
impl Projection for CustomerOrdersView {
    fn name(&self) -> &'static str {
        "CustomerOrdersView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let order_event = order_event(event)?;
        let order_id = event.aggregate_id;
        let mut state = self.state.write().await;

        match order_event {
            Some(OrderEvent::OrderPlaced(data)) => {
                if let Some(customer_id) = data.customer_id {
                    state.by_customer.entry(customer_id).or_default().push(order_id);
                }
                state.orders.insert(
                    order_id,
                    CustomerOrderRow {
                        order_id,
                        order_number: data.order_number.to_string(),
                        customer_id: data.customer_id,
                        status: OrderStatus::Pending,
                        total: data.totals.total,
                        item_count: data.items.iter().map(|i| i.quantity).sum(),
                        created_at: data.placed_at,
                    },
                );
            }
            Some(OrderEvent::StatusChanged(data)) => set_status(&mut state, order_id, data.to),
            Some(OrderEvent::OrderCancelled(_)) => {
                set_status(&mut state, order_id, OrderStatus::Cancelled)
            }
            Some(OrderEvent::RefundApproved(_)) => {
                set_status(&mut state, order_id, OrderStatus::Refunded)
            }
            Some(OrderEvent::OrderDiscarded(_)) => {
                if let Some(row) = state.orders.remove(&order_id)
                    && let Some(customer_id) = row.customer_id
                    && let Some(ids) = state.by_customer.get_mut(&customer_id)
                {
                    ids.retain(|id| *id != order_id);
                }
            }
            _ => {}
        }

        state.position = event.position;
        Ok(())
    }

    async fn position(&self) -> Position {
        self.state.read().await.position
    }

    async fn reset(&self) -> Result<()> {
        *self.state.write().await = CustomerOrdersState::default();
        Ok(())
    }
}

fn set_status(state: &mut CustomerOrdersState, order_id: AggregateId, status: OrderStatus) {
    if let Some(row) = state.orders.get_mut(&order_id) {
        row.status = status;
    }
}
