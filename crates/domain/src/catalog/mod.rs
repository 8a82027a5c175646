//! Product catalog and stock.
//!
//! The catalog is the source of live prices and stock levels. Carts and orders
//! only see it through [`ProductLookup`]; checkout and cancellation move stock
//! through [`InventoryAdjuster`].

mod product;
mod service;

pub use product::{
    NewProduct, Product, ProductEvent, ProductListedData, ProductUpdate, ProductUpdatedData,
    StockMovementData, StockRestockedData,
};
pub use service::CatalogService;

use async_trait::async_trait;
use common::{AggregateId, Money, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{DomainError, ErrorKind};
use crate::line_item::{MAX_QUANTITY_PER_ITEM, VariantSelector};

/// Errors raised by the product aggregate.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product is not in the catalog")]
    NotListed,

    #[error("Product already listed")]
    AlreadyListed,

    #[error("Product name must not be blank")]
    BlankName,

    #[error("Invalid price: {0} (must be greater than 0)")]
    InvalidPrice(Money),

    #[error("Invalid quantity: {0} (must be greater than 0)")]
    InvalidQuantity(u32),

    #[error("Variant {0} does not exist for this product")]
    VariantNotFound(VariantSelector),

    #[error("Variant {0} is listed more than once")]
    DuplicateVariant(VariantSelector),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotListed => ErrorKind::NotFound,
            _ => ErrorKind::Invalid,
        }
    }
}

/// A color/size unit with its own stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub color: String,
    pub size: String,
    pub stock: u32,
}

impl Variant {
    pub fn matches(&self, selector: &VariantSelector) -> bool {
        self.color == selector.color && self.size == selector.size
    }

    pub fn selector(&self) -> VariantSelector {
        VariantSelector::new(self.color.clone(), self.size.clone())
    }
}

/// What carts and orders need to know about a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    /// The first image, if any.
    pub image_url: Option<String>,
    pub stock: u32,
    pub variants: Vec<Variant>,
    pub active: bool,
}

impl ProductSnapshot {
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Stock available for the selected variant, or the product's top-level
    /// stock when no variant is selected.
    pub fn available(&self, variant: Option<&VariantSelector>) -> Result<u32, CatalogError> {
        match variant {
            Some(selector) => self
                .variants
                .iter()
                .find(|v| v.matches(selector))
                .map(|v| v.stock)
                .ok_or_else(|| CatalogError::VariantNotFound(selector.clone())),
            None => Ok(self.stock),
        }
    }

    /// Largest quantity a single line may hold: available stock capped at
    /// [`MAX_QUANTITY_PER_ITEM`].
    pub fn max_quantity(&self, variant: Option<&VariantSelector>) -> Result<u32, CatalogError> {
        Ok(self.available(variant)?.min(MAX_QUANTITY_PER_ITEM))
    }
}

/// One line's worth of stock held for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReservation {
    /// Idempotency key, see [`reservation_key`].
    pub key: String,
    pub product_id: ProductId,
    pub variant: Option<VariantSelector>,
    pub quantity: u32,
}

/// Builds the reservation key `<order id>:<line index>`.
pub fn reservation_key(order_id: AggregateId, line_index: usize) -> String {
    format!("{order_id}:{line_index}")
}

/// Read access to the catalog.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductSnapshot>, DomainError>;
}

/// Moves stock in and out of the catalog.
///
/// Both operations are idempotent per reservation key: repeating a reserve or
/// a release for the same key changes nothing. Stock is floored at zero and
/// oversell is not prevented.
#[async_trait]
pub trait InventoryAdjuster: Send + Sync {
    async fn reserve(&self, reservation: &StockReservation) -> Result<(), DomainError>;

    async fn release(&self, product_id: ProductId, key: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tee() -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(),
            name: "Tee".to_string(),
            price: Money::from_cents(2000),
            image_url: None,
            stock: 40,
            variants: vec![
                Variant {
                    color: "red".to_string(),
                    size: "M".to_string(),
                    stock: 3,
                },
                Variant {
                    color: "red".to_string(),
                    size: "L".to_string(),
                    stock: 25,
                },
            ],
            active: true,
        }
    }

    #[test]
    fn max_quantity_uses_variant_stock_and_per_item_cap() {
        let product = tee();
        assert_eq!(
            product
                .max_quantity(Some(&VariantSelector::new("red", "M")))
                .unwrap(),
            3
        );
        assert_eq!(
            product
                .max_quantity(Some(&VariantSelector::new("red", "L")))
                .unwrap(),
            MAX_QUANTITY_PER_ITEM
        );
        assert_eq!(product.max_quantity(None).unwrap(), MAX_QUANTITY_PER_ITEM);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = tee()
            .available(Some(&VariantSelector::new("blue", "M")))
            .unwrap_err();
        assert!(matches!(err, CatalogError::VariantNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn reservation_key_format() {
        let order_id = AggregateId::new();
        assert_eq!(reservation_key(order_id, 2), format!("{order_id}:2"));
    }
}
