//! Customer notifications for order transitions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::AggregateId;
use domain::{OrderEvent, OrderStatus};
use event_store::{EventEnvelope, Position};
use tokio::sync::RwLock;

use crate::Result;
use crate::notifier::Notifier;
use crate::projection::{Projection, order_event};

#[derive(Debug, Clone)]
struct Recipient {
    email: String,
    order_number: String,
}

#[derive(Default)]
struct DispatcherState {
    recipients: HashMap<AggregateId, Recipient>,
    position: Position,
}

/// Emails the customer on placement, status changes, cancellation and each
/// refund step.
///
/// A failed send is logged and counted; the event still counts as handled.
/// Events at or before `live_after` only rebuild the recipient table, so a
/// restarted process does not mail customers about transitions twice.
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    live_after: Position,
    state: RwLock<DispatcherState>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::resuming_after(notifier, Position::start())
    }

    /// A dispatcher that stays silent for every event up to and including
    /// `live_after`, usually the log head when the process starts.
    pub fn resuming_after(notifier: Arc<dyn Notifier>, live_after: Position) -> Self {
        Self {
            notifier,
            live_after,
            state: RwLock::new(DispatcherState::default()),
        }
    }

    async fn send(&self, recipient: &Recipient, subject: String, body: String) {
        match self.notifier.send(&recipient.email, &subject, &body).await {
            Ok(()) => metrics::counter!("notifications_sent_total").increment(1),
            Err(err) => {
                metrics::counter!("notifications_failed_total").increment(1);
                tracing::warn!(
                    order_number = %recipient.order_number,
                    error = %err,
                    "notification not delivered"
                );
            }
        }
    }
}

fn message(recipient: &Recipient, event: &OrderEvent) -> Option<(String, String)> {
    let number = &recipient.order_number;
    let message = match event {
        OrderEvent::OrderPlaced(data) => (
            format!("Order {number} confirmed"),
            format!(
                "Thanks for your order. {} item(s), total {}.",
                data.items.iter().map(|i| i.quantity).sum::<u32>(),
                data.totals.total
            ),
        ),
        OrderEvent::StatusChanged(data) => {
            let mut body = format!("Your order is now {}.", data.to);
            if data.to == OrderStatus::Shipped
                && let Some(eta) = data.estimated_delivery
            {
                body.push_str(&format!(" Estimated delivery: {}.", eta.format("%Y-%m-%d")));
            }
            (format!("Order {number} is {}", data.to), body)
        }
        OrderEvent::OrderCancelled(data) => (
            format!("Order {number} cancelled"),
            match &data.reason {
                Some(reason) => format!("Your order was cancelled: {reason}"),
                None => "Your order was cancelled.".to_string(),
            },
        ),
        OrderEvent::RefundRequested(data) => (
            format!("Refund requested for order {number}"),
            format!("We received your refund request for {}.", data.amount),
        ),
        OrderEvent::RefundApproved(_) => (
            format!("Refund approved for order {number}"),
            "Your refund was approved and is on its way.".to_string(),
        ),
        OrderEvent::RefundRejected(data) => (
            format!("Refund declined for order {number}"),
            match &data.note {
                Some(note) => format!("Your refund request was declined: {note}"),
                None => "Your refund request was declined.".to_string(),
            },
        ),
        _ => return None,
    };
    Some(message)
}

#[async_trait]
impl Projection for NotificationDispatcher {
    fn name(&self) -> &'static str {
        "NotificationDispatcher"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        if let Some(order_event) = order_event(event)? {
            if let OrderEvent::OrderPlaced(data) = &order_event {
                self.state.write().await.recipients.insert(
                    event.aggregate_id,
                    Recipient {
                        email: data.email.clone(),
                        order_number: data.order_number.to_string(),
                    },
                );
            }

            let recipient = self
                .state
                .read()
                .await
                .recipients
                .get(&event.aggregate_id)
                .cloned();
            if event.position > self.live_after
                && let Some(recipient) = recipient
                && let Some((subject, body)) = message(&recipient, &order_event)
            {
                self.send(&recipient, subject, body).await;
            }
        }

        self.state.write().await.position = event.position;
        Ok(())
    }

    async fn position(&self) -> Position {
        self.state.read().await.position
    }

    async fn reset(&self) -> Result<()> {
        *self.state.write().await = DispatcherState::default();
        Ok(())
    }
}
