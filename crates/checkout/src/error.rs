//! Checkout error types.

use common::AggregateId;
use domain::{DomainError, ErrorKind};
use thiserror::Error;

/// Errors that can occur during checkout and refund payout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("A shipping address is required")]
    MissingShippingAddress,

    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),

    /// The gateway refused the payment.
    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    /// The gateway could not be reached or returned an unexpected error.
    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    #[error("Order {0} has no payment to refund")]
    NoPaymentIntent(AggregateId),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CheckoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::EmptyCart
            | CheckoutError::MissingShippingAddress
            | CheckoutError::InvalidCoupon(_)
            | CheckoutError::PaymentDeclined(_)
            | CheckoutError::NoPaymentIntent(_) => ErrorKind::Invalid,
            CheckoutError::PaymentGateway(_) => ErrorKind::Internal,
            CheckoutError::Domain(err) => err.kind(),
        }
    }

    pub fn is_state_conflict(&self) -> bool {
        matches!(self, CheckoutError::Domain(err) if err.is_state_conflict())
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
