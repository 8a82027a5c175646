//! Order aggregate, status lifecycle and order numbering.

mod aggregate;
mod commands;
mod events;
mod number;
mod service;
mod status;
mod value_objects;

pub use aggregate::Order;
pub use commands::*;
pub use events::{
    OrderCancelledData, OrderDiscardedData, OrderEvent, OrderPlacedData, PaymentAuthorizedData,
    PaymentStatusRecordedData, RefundCompletedData, RefundRequestedData, RefundReviewedData,
    StatusChangedData,
};
pub use number::{DailyOrderSequence, OrderNumber, SequenceEvent, sequence_id};
pub use service::OrderService;
pub use status::OrderStatus;
pub use value_objects::{
    OrderSummary, PaymentInfo, PaymentStatus, RefundInfo, RefundStatus, StatusHistoryEntry,
};

use common::{Money, ProductId};
use thiserror::Error;

use crate::address::MissingAddressField;
use crate::error::ErrorKind;
use crate::line_item::VariantSelector;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order has no items")]
    NoItems,

    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(u32),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Product {0} is not available for sale")]
    ProductInactive(ProductId),

    #[error("Product {0} requires a color and size")]
    VariantRequired(ProductId),

    #[error("Variant {0} does not exist for this product")]
    VariantNotFound(VariantSelector),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] MissingAddressField),

    #[error("A contact email is required")]
    EmailRequired,

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error("Invalid state transition: cannot {action} an order that is {from}")]
    InvalidTransition {
        from: OrderStatus,
        action: &'static str,
    },

    #[error("Invalid state transition: cannot move an order from {from} to {to}")]
    IllegalStatusChange { from: OrderStatus, to: OrderStatus },

    #[error("A refund has already been requested for this order")]
    RefundAlreadyRequested,

    #[error("Refund is not {expected}")]
    RefundNotInState { expected: RefundStatus },

    #[error("Invalid refund amount {amount}: must be greater than 0 and at most {total}")]
    InvalidRefundAmount { amount: Money, total: Money },

    #[error("Payment intent {0} does not belong to this order")]
    PaymentIntentMismatch(String),

    #[error("Order already placed")]
    AlreadyPlaced,

    #[error("Order not found")]
    NotPlaced,
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::NotPlaced => ErrorKind::NotFound,
            _ => ErrorKind::Invalid,
        }
    }

    /// True for refusals caused by the order's current status.
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            OrderError::InvalidTransition { .. }
                | OrderError::IllegalStatusChange { .. }
                | OrderError::RefundAlreadyRequested
                | OrderError::RefundNotInState { .. }
                | OrderError::AlreadyPlaced
        )
    }
}
