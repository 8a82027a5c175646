//! Cart domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, CustomerId};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::aggregate::DomainEvent;
use crate::coupon::Coupon;
use crate::line_item::{LineItem, LineItemId};

/// Events that can occur on a cart. Every event carries the time it happened,
/// which becomes the cart's `last_updated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CartEvent {
    CartOpened {
        cart_id: AggregateId,
        customer_id: CustomerId,
        at: DateTime<Utc>,
    },
    ItemAdded {
        item: LineItem,
        at: DateTime<Utc>,
    },
    ItemQuantityChanged {
        item_id: LineItemId,
        quantity: u32,
        at: DateTime<Utc>,
    },
    ItemRemoved {
        item_id: LineItemId,
        at: DateTime<Utc>,
    },
    CartCleared {
        at: DateTime<Utc>,
    },
    CouponApplied {
        coupon: Coupon,
        at: DateTime<Utc>,
    },
    CouponRemoved {
        at: DateTime<Utc>,
    },
    ShippingAddressSet {
        address: Address,
        at: DateTime<Utc>,
    },
    /// The cart's contents became an order.
    CartCheckedOut {
        order_id: AggregateId,
        at: DateTime<Utc>,
    },
}

impl CartEvent {
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::CartOpened { at, .. }
            | CartEvent::ItemAdded { at, .. }
            | CartEvent::ItemQuantityChanged { at, .. }
            | CartEvent::ItemRemoved { at, .. }
            | CartEvent::CartCleared { at }
            | CartEvent::CouponApplied { at, .. }
            | CartEvent::CouponRemoved { at }
            | CartEvent::ShippingAddressSet { at, .. }
            | CartEvent::CartCheckedOut { at, .. } => *at,
        }
    }
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::CartOpened { .. } => "CartOpened",
            CartEvent::ItemAdded { .. } => "ItemAdded",
            CartEvent::ItemQuantityChanged { .. } => "ItemQuantityChanged",
            CartEvent::ItemRemoved { .. } => "ItemRemoved",
            CartEvent::CartCleared { .. } => "CartCleared",
            CartEvent::CouponApplied { .. } => "CouponApplied",
            CartEvent::CouponRemoved { .. } => "CouponRemoved",
            CartEvent::ShippingAddressSet { .. } => "ShippingAddressSet",
            CartEvent::CartCheckedOut { .. } => "CartCheckedOut",
        }
    }
}
