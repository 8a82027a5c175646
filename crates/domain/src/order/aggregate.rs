//! Order aggregate implementation.

use chrono::{DateTime, Duration, Utc};
use common::{AggregateId, CustomerId, Money};
use event_store::Version;

use crate::address::Address;
use crate::aggregate::Aggregate;
use crate::catalog::{StockReservation, reservation_key};
use crate::coupon::Coupon;
use crate::line_item::LineItem;
use crate::pricing::{self, PriceBreakdown};

use super::{
    OrderCancelledData, OrderDiscardedData, OrderError, OrderEvent, OrderNumber, OrderPlacedData,
    OrderStatus, OrderSummary, PaymentAuthorizedData, PaymentInfo, PaymentStatus,
    PaymentStatusRecordedData, PlaceOrder, RefundCompletedData, RefundInfo, RefundRequestedData,
    RefundReviewedData, RefundStatus, StatusChangedData, StatusHistoryEntry,
};

/// Days between shipping and the estimated delivery date.
const ESTIMATED_DELIVERY_DAYS: i64 = 3;

/// Order aggregate root.
///
/// Line items, addresses, coupon and totals are frozen when the order is
/// placed. Afterwards only the status, refund, payment record and discard
/// flag change.
#[derive(Debug, Clone, Default)]
pub struct Order {
    id: Option<AggregateId>,
    version: Version,
    order_number: OrderNumber,
    customer_id: Option<CustomerId>,
    email: String,
    items: Vec<LineItem>,
    shipping_address: Option<Address>,
    billing_address: Option<Address>,
    coupon: Option<Coupon>,
    totals: PriceBreakdown,
    payment: PaymentInfo,
    status: OrderStatus,
    history: Vec<StatusHistoryEntry>,
    refund: Option<RefundInfo>,
    created_at: Option<DateTime<Utc>>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    estimated_delivery: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    discarded: bool,
}

impl Aggregate for Order {
    type Event = OrderEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "Order"
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
            OrderEvent::OrderPlaced(data) => self.apply_placed(data),
            OrderEvent::StatusChanged(data) => {
                match data.to {
                    OrderStatus::Shipped => {
                        self.shipped_at = Some(data.changed_at);
                        self.estimated_delivery = data.estimated_delivery;
                    }
                    OrderStatus::Delivered => self.delivered_at = Some(data.changed_at),
                    _ => {}
                }
                self.record_status(data.to, data.changed_at, data.note);
            }
            OrderEvent::OrderCancelled(data) => {
                self.cancelled_at = Some(data.cancelled_at);
                self.record_status(OrderStatus::Cancelled, data.cancelled_at, data.reason);
            }
            OrderEvent::RefundRequested(data) => {
                self.refund = Some(RefundInfo {
                    amount: data.amount,
                    reason: data.reason,
                    status: RefundStatus::Pending,
                    requested_at: data.requested_at,
                    reviewed_at: None,
                    review_note: None,
                    gateway_reference: None,
                });
            }
            OrderEvent::RefundApproved(data) => {
                self.review_refund(RefundStatus::Approved, &data);
                self.record_status(OrderStatus::Refunded, data.reviewed_at, data.note);
            }
            OrderEvent::RefundRejected(data) => {
                self.review_refund(RefundStatus::Rejected, &data);
            }
            OrderEvent::RefundCompleted(data) => {
                if let Some(refund) = self.refund.as_mut() {
                    refund.status = RefundStatus::Completed;
                    refund.gateway_reference = Some(data.gateway_reference);
                }
                self.payment.status = PaymentStatus::Refunded;
            }
            OrderEvent::PaymentAuthorized(data) => {
                self.payment.intent_id = Some(data.intent_id);
                self.payment.status = PaymentStatus::Authorized;
            }
            OrderEvent::PaymentStatusRecorded(data) => {
                self.payment.intent_id.get_or_insert(data.intent_id);
                self.payment.status = data.status;
            }
            OrderEvent::OrderDiscarded(_) => self.discarded = true,
        }
    }
}

impl Order {
    fn apply_placed(&mut self, data: OrderPlacedData) {
        self.id = Some(data.order_id);
        self.order_number = data.order_number;
        self.customer_id = data.customer_id;
        self.email = data.email;
        self.items = data.items;
        self.shipping_address = Some(data.shipping_address);
        self.billing_address = data.billing_address;
        self.coupon = data.coupon;
        self.totals = data.totals;
        self.payment = PaymentInfo {
            method: data.payment_method,
            intent_id: None,
            status: PaymentStatus::Pending,
        };
        self.created_at = Some(data.placed_at);
        self.record_status(OrderStatus::Pending, data.placed_at, None);
    }

    fn record_status(&mut self, status: OrderStatus, at: DateTime<Utc>, note: Option<String>) {
        self.status = status;
        self.history.push(StatusHistoryEntry { status, at, note });
    }

    fn review_refund(&mut self, status: RefundStatus, data: &RefundReviewedData) {
        if let Some(refund) = self.refund.as_mut() {
            refund.status = status;
            refund.reviewed_at = Some(data.reviewed_at);
            refund.review_note = data.note.clone();
        }
    }
}

// Query methods
impl Order {
    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    pub fn billing_address(&self) -> Option<&Address> {
        self.billing_address.as_ref()
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    pub fn totals(&self) -> PriceBreakdown {
        self.totals
    }

    pub fn payment(&self) -> &PaymentInfo {
        &self.payment
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn history(&self) -> &[StatusHistoryEntry] {
        &self.history
    }

    pub fn refund(&self) -> Option<&RefundInfo> {
        self.refund.as_ref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn estimated_delivery(&self) -> Option<DateTime<Utc>> {
        self.estimated_delivery
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    pub fn total_item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            order_number: self.order_number.clone(),
            total_item_count: self.total_item_count(),
            total_price: self.totals.total,
            status: self.status,
            created_at: self.created_at.unwrap_or_default(),
        }
    }

    /// One reservation per line, keyed `<order id>:<line index>`.
    pub fn stock_reservations(&self) -> Vec<StockReservation> {
        let Some(order_id) = self.id else {
            return vec![];
        };
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| StockReservation {
                key: reservation_key(order_id, index),
                product_id: item.product_id,
                variant: item.variant.clone(),
                quantity: item.quantity,
            })
            .collect()
    }

    fn ensure_live(&self) -> Result<(), OrderError> {
        if self.id.is_none() || self.discarded {
            return Err(OrderError::NotPlaced);
        }
        Ok(())
    }

    fn pending_refund(&self) -> Result<&RefundInfo, OrderError> {
        match &self.refund {
            Some(refund) if refund.status == RefundStatus::Pending => Ok(refund),
            _ => Err(OrderError::RefundNotInState {
                expected: RefundStatus::Pending,
            }),
        }
    }
}

// Command methods (return events)
impl Order {
    /// Places the order from priced line items. Totals are computed here from
    /// the items and coupon.
    pub fn place(
        &self,
        order_number: OrderNumber,
        cmd: &PlaceOrder,
        items: Vec<LineItem>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_some() {
            return Err(OrderError::AlreadyPlaced);
        }
        if items.is_empty() {
            return Err(OrderError::NoItems);
        }
        if cmd.email.trim().is_empty() {
            return Err(OrderError::EmailRequired);
        }
        cmd.shipping_address.validate()?;
        if let Some(billing) = &cmd.billing_address {
            billing.validate()?;
        }

        let totals = pricing::quote(&items, cmd.coupon.as_ref());

        Ok(vec![OrderEvent::OrderPlaced(OrderPlacedData {
            order_id: cmd.order_id,
            order_number,
            customer_id: cmd.customer_id,
            email: cmd.email.trim().to_string(),
            items,
            shipping_address: cmd.shipping_address.clone(),
            billing_address: cmd.billing_address.clone(),
            coupon: cmd.coupon.clone(),
            totals,
            payment_method: cmd.payment_method.clone(),
            placed_at: cmd.placed_at,
        })])
    }

    /// Moves the order forward along `pending → processing → shipped → delivered`.
    ///
    /// Cancellation and refunds have their own commands.
    pub fn update_status(
        &self,
        to: OrderStatus,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_live()?;
        if !self.status.can_advance_to(to) {
            return Err(OrderError::IllegalStatusChange {
                from: self.status,
                to,
            });
        }

        let estimated_delivery =
            (to == OrderStatus::Shipped).then(|| at + Duration::days(ESTIMATED_DELIVERY_DAYS));

        Ok(vec![OrderEvent::StatusChanged(StatusChangedData {
            from: self.status,
            to,
            note,
            changed_at: at,
            estimated_delivery,
        })])
    }

    pub fn cancel(
        &self,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_live()?;
        if !self.status.can_cancel() {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                action: "cancel",
            });
        }

        Ok(vec![OrderEvent::OrderCancelled(OrderCancelledData {
            from: self.status,
            reason,
            releases: self.stock_reservations(),
            cancelled_at: at,
        })])
    }

    /// Requests a refund of `amount`, or of the full total when `None`.
    pub fn request_refund(
        &self,
        reason: String,
        amount: Option<Money>,
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_live()?;
        if !self.status.can_refund() {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                action: "request a refund for",
            });
        }
        if self.refund.is_some() {
            return Err(OrderError::RefundAlreadyRequested);
        }

        let total = self.totals.total;
        let amount = amount.unwrap_or(total);
        if !amount.is_positive() || amount > total {
            return Err(OrderError::InvalidRefundAmount { amount, total });
        }

        Ok(vec![OrderEvent::RefundRequested(RefundRequestedData {
            amount,
            reason,
            requested_at: at,
        })])
    }

    pub fn approve_refund(
        &self,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_live()?;
        self.pending_refund()?;
        if !self.status.can_refund() {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                action: "refund",
            });
        }

        Ok(vec![OrderEvent::RefundApproved(RefundReviewedData {
            note,
            reviewed_at: at,
        })])
    }

    pub fn reject_refund(
        &self,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_live()?;
        self.pending_refund()?;

        Ok(vec![OrderEvent::RefundRejected(RefundReviewedData {
            note,
            reviewed_at: at,
        })])
    }

    /// Records that the gateway paid an approved refund out. Repeating it is a
    /// no-op.
    pub fn complete_refund(
        &self,
        gateway_reference: String,
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_live()?;
        match &self.refund {
            Some(refund) if refund.status == RefundStatus::Completed => Ok(vec![]),
            Some(refund) if refund.status == RefundStatus::Approved => {
                Ok(vec![OrderEvent::RefundCompleted(RefundCompletedData {
                    amount: refund.amount,
                    gateway_reference,
                    completed_at: at,
                })])
            }
            _ => Err(OrderError::RefundNotInState {
                expected: RefundStatus::Approved,
            }),
        }
    }

    pub fn record_payment_authorized(
        &self,
        intent_id: String,
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_live()?;
        Ok(vec![OrderEvent::PaymentAuthorized(PaymentAuthorizedData {
            intent_id,
            authorized_at: at,
        })])
    }

    /// Records a provider-reported payment status. The order status is left
    /// alone.
    pub fn record_payment_status(
        &self,
        intent_id: String,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_live()?;
        if let Some(known) = &self.payment.intent_id
            && *known != intent_id
        {
            return Err(OrderError::PaymentIntentMismatch(intent_id));
        }

        Ok(vec![OrderEvent::PaymentStatusRecorded(
            PaymentStatusRecordedData {
                intent_id,
                status,
                recorded_at: at,
            },
        )])
    }

    pub fn discard(&self, at: DateTime<Utc>) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_live()?;
        if self.status != OrderStatus::Pending {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                action: "discard",
            });
        }

        Ok(vec![OrderEvent::OrderDiscarded(OrderDiscardedData {
            releases: self.stock_reservations(),
            discarded_at: at,
        })])
    }
}
