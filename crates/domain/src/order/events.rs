//! Order domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, CustomerId, Money};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::aggregate::DomainEvent;
use crate::catalog::StockReservation;
use crate::coupon::Coupon;
use crate::line_item::LineItem;
use crate::pricing::PriceBreakdown;

use super::{OrderNumber, OrderStatus, PaymentStatus};

/// Events that can occur on an order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    OrderPlaced(OrderPlacedData),

    /// Moved along the fulfillment chain by an administrator.
    StatusChanged(StatusChangedData),

    OrderCancelled(OrderCancelledData),

    RefundRequested(RefundRequestedData),

    /// Approval also moves the order to `refunded`.
    RefundApproved(RefundReviewedData),

    RefundRejected(RefundReviewedData),

    /// The gateway returned the money.
    RefundCompleted(RefundCompletedData),

    PaymentAuthorized(PaymentAuthorizedData),

    /// A status reported by the payment provider's webhook.
    PaymentStatusRecorded(PaymentStatusRecordedData),

    /// Deleted by its owner while still pending.
    OrderDiscarded(OrderDiscardedData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "OrderPlaced",
            OrderEvent::StatusChanged(_) => "OrderStatusChanged",
            OrderEvent::OrderCancelled(_) => "OrderCancelled",
            OrderEvent::RefundRequested(_) => "RefundRequested",
            OrderEvent::RefundApproved(_) => "RefundApproved",
            OrderEvent::RefundRejected(_) => "RefundRejected",
            OrderEvent::RefundCompleted(_) => "RefundCompleted",
            OrderEvent::PaymentAuthorized(_) => "PaymentAuthorized",
            OrderEvent::PaymentStatusRecorded(_) => "PaymentStatusRecorded",
            OrderEvent::OrderDiscarded(_) => "OrderDiscarded",
        }
    }
}

/// Snapshot of everything the order was placed with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedData {
    pub order_id: AggregateId,
    pub order_number: OrderNumber,
    /// `None` for guest checkouts.
    pub customer_id: Option<CustomerId>,
    pub email: String,
    pub items: Vec<LineItem>,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub coupon: Option<Coupon>,
    pub totals: PriceBreakdown,
    pub payment_method: String,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangedData {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub note: Option<String>,
    pub changed_at: DateTime<Utc>,
    /// Set when the order ships.
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledData {
    pub from: OrderStatus,
    pub reason: Option<String>,
    /// Stock to hand back, one entry per line.
    pub releases: Vec<StockReservation>,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequestedData {
    pub amount: Money,
    pub reason: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundReviewedData {
    pub note: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundCompletedData {
    pub amount: Money,
    pub gateway_reference: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAuthorizedData {
    pub intent_id: String,
    pub authorized_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusRecordedData {
    pub intent_id: String,
    pub status: PaymentStatus,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDiscardedData {
    pub releases: Vec<StockReservation>,
    pub discarded_at: DateTime<Utc>,
}
