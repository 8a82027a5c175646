//! Checkout for the storefront.
//!
//! A checkout turns a cart (or a guest's item list) into a pending order:
//! 1. Place the order at live catalog prices
//! 2. Reserve stock for every line
//! 3. Authorize payment for the order total
//! 4. Record the payment intent and empty the cart
//!
//! If reservation or authorization fails, reservations made so far are
//! released and the order is cancelled.

pub mod coordinator;
pub mod error;
pub mod services;

pub use coordinator::{CheckoutCoordinator, CheckoutReceipt, CheckoutRequest};
pub use error::CheckoutError;
pub use services::{InMemoryPaymentGateway, PaymentGateway, PaymentHandle};
