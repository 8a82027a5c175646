//! External services used during checkout.

pub mod payment;

pub use payment::{InMemoryPaymentGateway, PaymentGateway, PaymentHandle};
