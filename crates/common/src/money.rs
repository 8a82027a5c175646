//! Exact decimal money amounts.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A money amount in the store currency's standard unit (dollars, not cents).
///
/// Backed by [`Decimal`] so tax at 8.5% on $55.00 stays exactly $4.675;
/// nothing is rounded until a value is displayed or handed to a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates an amount from a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Wraps a decimal amount.
    pub fn from_decimal(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns zero.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the exact decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the amount in cents, rounded half away from zero.
    pub fn to_cents(&self) -> i64 {
        let cents = (self.0 * Decimal::ONE_HUNDRED).round();
        i64::try_from(cents).unwrap_or(if cents.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Multiplies by a quantity.
    pub fn times(&self, quantity: u32) -> Money {
        Money(self.0 * Decimal::from(quantity))
    }

    /// Multiplies by a decimal rate (e.g. a tax rate of `0.085`).
    pub fn scale(&self, rate: Decimal) -> Money {
        Money(self.0 * rate)
    }

    /// Clamps the amount into `[min, max]`.
    pub fn clamp_between(self, min: Money, max: Money) -> Money {
        if self < min {
            min
        } else if self > max {
            max
        } else {
            self
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rounded = self.0.round_dp(2);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-${:.2}", rounded.abs())
        } else {
            write!(f, "${:.2}", rounded.abs())
        }
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_is_exact() {
        let money = Money::from_cents(1234);
        assert_eq!(money.amount(), Decimal::new(1234, 2));
        assert_eq!(money.to_cents(), 1234);
    }

    #[test]
    fn display_rounds_to_cents() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
        assert_eq!(Money::from_decimal(Decimal::new(4675, 3)).to_string(), "$4.68");
    }

    #[test]
    fn arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);

        assert_eq!(a + b, Money::from_cents(1250));
        assert_eq!(a - b, Money::from_cents(750));
        assert_eq!(b.times(3), Money::from_cents(750));
        assert_eq!(
            Money::from_cents(5500).scale(Decimal::new(85, 3)),
            Money::from_decimal(Decimal::new(4675, 3))
        );
    }

    #[test]
    fn sums_and_clamps() {
        let total: Money = [Money::from_cents(100), Money::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(350));

        let clamped = Money::from_cents(900).clamp_between(Money::zero(), Money::from_cents(500));
        assert_eq!(clamped, Money::from_cents(500));
        let floor = Money::from_cents(-1).clamp_between(Money::zero(), Money::from_cents(500));
        assert_eq!(floor, Money::zero());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Money::from_cents(5500)).unwrap();
        assert_eq!(json, "\"55.00\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Money::from_cents(5500));
    }

    #[test]
    fn sign_checks() {
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(-1).is_negative());
    }
}
