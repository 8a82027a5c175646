//! Cart and order totals.
//!
//! All arithmetic is exact decimal; nothing is rounded here.

use common::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::coupon::Coupon;
use crate::line_item::LineItem;

/// Sales tax rate applied to the subtotal (8.5%).
pub fn tax_rate() -> Decimal {
    Decimal::new(85, 3)
}

/// Subtotal at or above which shipping is free.
pub fn free_shipping_threshold() -> Money {
    Money::from_cents(5000)
}

/// Shipping fee below the free-shipping threshold.
pub fn flat_shipping_fee() -> Money {
    Money::from_cents(599)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub discount: Money,
    pub total: Money,
}

/// Prices a list of line items with an optional coupon.
///
/// `total` is not floored at zero. An empty list prices to all zeros,
/// shipping included.
pub fn quote(items: &[LineItem], coupon: Option<&Coupon>) -> PriceBreakdown {
    if items.is_empty() {
        return PriceBreakdown::default();
    }

    let subtotal: Money = items.iter().map(LineItem::line_total).sum();
    let tax = subtotal.scale(tax_rate());
    let shipping = if subtotal >= free_shipping_threshold() {
        Money::zero()
    } else {
        flat_shipping_fee()
    };
    let discount = coupon
        .map(|coupon| coupon.discount_for(subtotal))
        .unwrap_or_default();

    PriceBreakdown {
        subtotal,
        tax,
        shipping,
        discount,
        total: subtotal + tax + shipping - discount,
    }
}
