//! Order commands.

use chrono::{DateTime, Utc};
use common::{AggregateId, CustomerId, Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::command::Command;
use crate::coupon::Coupon;
use crate::line_item::VariantSelector;

use super::{Order, OrderStatus};

/// A product and quantity to order. Prices are looked up, never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub variant: Option<VariantSelector>,
}

impl OrderLine {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            variant: None,
        }
    }

    pub fn with_variant(mut self, variant: VariantSelector) -> Self {
        self.variant = Some(variant);
        self
    }
}

/// Command to place an order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub order_id: AggregateId,

    /// `None` for a guest checkout.
    pub customer_id: Option<CustomerId>,

    pub email: String,

    pub lines: Vec<OrderLine>,

    pub shipping_address: Address,

    pub billing_address: Option<Address>,

    pub coupon: Option<Coupon>,

    pub payment_method: String,

    /// Decides the order-number day.
    pub placed_at: DateTime<Utc>,
}

impl PlaceOrder {
    /// Creates a card-paid order placed now, under a fresh id.
    pub fn new(
        customer_id: Option<CustomerId>,
        email: impl Into<String>,
        lines: Vec<OrderLine>,
        shipping_address: Address,
    ) -> Self {
        Self {
            order_id: AggregateId::new(),
            customer_id,
            email: email.into(),
            lines,
            shipping_address,
            billing_address: None,
            coupon: None,
            payment_method: "card".to_string(),
            placed_at: Utc::now(),
        }
    }

    pub fn with_coupon(mut self, coupon: Option<Coupon>) -> Self {
        self.coupon = coupon;
        self
    }

    pub fn with_billing_address(mut self, address: Option<Address>) -> Self {
        self.billing_address = address;
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }

    pub fn placed_at(mut self, at: DateTime<Utc>) -> Self {
        self.placed_at = at;
        self
    }
}

impl Command for PlaceOrder {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to move an order to a new status (administrators only).
#[derive(Debug, Clone)]
pub struct UpdateOrderStatus {
    pub order_id: AggregateId,
    pub status: OrderStatus,
    pub note: Option<String>,
}

impl UpdateOrderStatus {
    pub fn new(order_id: AggregateId, status: OrderStatus) -> Self {
        Self {
            order_id,
            status,
            note: None,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}

impl Command for UpdateOrderStatus {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to cancel an order.
#[derive(Debug, Clone)]
pub struct CancelOrder {
    pub order_id: AggregateId,
    pub reason: Option<String>,
}

impl CancelOrder {
    pub fn new(order_id: AggregateId, reason: Option<String>) -> Self {
        Self { order_id, reason }
    }
}

impl Command for CancelOrder {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to ask for money back.
#[derive(Debug, Clone)]
pub struct RequestRefund {
    pub order_id: AggregateId,
    pub reason: String,
    /// Defaults to the order total.
    pub amount: Option<Money>,
}

impl RequestRefund {
    pub fn new(order_id: AggregateId, reason: impl Into<String>, amount: Option<Money>) -> Self {
        Self {
            order_id,
            reason: reason.into(),
            amount,
        }
    }
}

impl Command for RequestRefund {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to approve or reject a pending refund.
#[derive(Debug, Clone)]
pub struct ReviewRefund {
    pub order_id: AggregateId,
    pub note: Option<String>,
}

impl ReviewRefund {
    pub fn new(order_id: AggregateId, note: Option<String>) -> Self {
        Self { order_id, note }
    }
}

impl Command for ReviewRefund {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}
