//! Discount codes.

use std::collections::HashMap;

use async_trait::async_trait;
use common::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` is a percentage of the subtotal.
    Percentage,
    /// `value` is an amount in the store currency.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub value: Decimal,
    pub kind: DiscountKind,
}

impl Coupon {
    pub fn percentage(code: impl Into<String>, percent: Decimal) -> Self {
        Self {
            code: code.into(),
            value: percent,
            kind: DiscountKind::Percentage,
        }
    }

    pub fn fixed(code: impl Into<String>, amount: Money) -> Self {
        Self {
            code: code.into(),
            value: amount.amount(),
            kind: DiscountKind::Fixed,
        }
    }

    /// Discount this coupon grants on `subtotal`, clamped to `[0, subtotal]`.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        let raw = match self.kind {
            DiscountKind::Percentage => subtotal.scale(self.value / Decimal::ONE_HUNDRED),
            DiscountKind::Fixed => Money::from_decimal(self.value),
        };
        raw.clamp_between(Money::zero(), subtotal.max(Money::zero()))
    }
}

/// Resolves coupon codes.
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Looks a code up case-insensitively.
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, DomainError>;
}

/// A fixed in-process coupon table.
#[derive(Debug, Clone)]
pub struct StaticCouponRepository {
    coupons: HashMap<String, Coupon>,
}

impl StaticCouponRepository {
    pub fn new(coupons: impl IntoIterator<Item = Coupon>) -> Self {
        let coupons = coupons
            .into_iter()
            .map(|coupon| (coupon.code.to_ascii_uppercase(), coupon))
            .collect();
        Self { coupons }
    }
}

impl Default for StaticCouponRepository {
    /// The store's built-in codes: `SAVE10`, `SAVE20` and `WELCOME5`.
    fn default() -> Self {
        Self::new([
            Coupon::percentage("SAVE10", Decimal::new(10, 0)),
            Coupon::percentage("SAVE20", Decimal::new(20, 0)),
            Coupon::fixed("WELCOME5", Money::from_cents(500)),
        ])
    }
}

#[async_trait]
impl CouponRepository for StaticCouponRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, DomainError> {
        Ok(self.coupons.get(&code.trim().to_ascii_uppercase()).cloned())
    }
}
