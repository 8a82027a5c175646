//! Shopping cart aggregate.

mod aggregate;
mod events;
mod service;

pub use aggregate::Cart;
pub use events::CartEvent;
pub use service::{AddCartItem, CartService, cart_id};

use common::ProductId;
use thiserror::Error;

use crate::address::MissingAddressField;
use crate::error::ErrorKind;
use crate::line_item::{LineItemId, VariantSelector};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(u32),

    #[error("Item not found in cart: {0}")]
    ItemNotFound(LineItemId),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Product {0} is not available for sale")]
    ProductInactive(ProductId),

    #[error("Variant {0} does not exist for this product")]
    VariantNotFound(VariantSelector),

    #[error("Product {0} is out of stock")]
    OutOfStock(ProductId),

    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),

    #[error("Invalid shipping address: {0}")]
    InvalidAddress(#[from] MissingAddressField),

    #[error("Cart is empty")]
    Empty,
}

impl CartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::ItemNotFound(_) | CartError::ProductNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Invalid,
        }
    }
}
