//! Line items shared by carts and orders.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on the quantity of a single line item.
pub const MAX_QUANTITY_PER_ITEM: u32 = 10;

/// Identifier of a line inside a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(Uuid);

impl LineItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LineItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LineItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A color/size choice identifying one product variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantSelector {
    pub color: String,
    pub size: String,
}

impl VariantSelector {
    pub fn new(color: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            size: size.into(),
        }
    }
}

impl std::fmt::Display for VariantSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.color, self.size)
    }
}

/// A product, variant and quantity with the product's name, price and image
/// frozen at the time the line was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: LineItemId,
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub max_quantity: u32,
    pub variant: Option<VariantSelector>,
}

impl LineItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }

    /// True if this line is for the same product and variant.
    pub fn matches(&self, product_id: ProductId, variant: Option<&VariantSelector>) -> bool {
        self.product_id == product_id && self.variant.as_ref() == variant
    }

    /// Clamps a requested quantity into `[1, max_quantity]`.
    pub fn clamp_quantity(&self, quantity: u32) -> u32 {
        quantity.clamp(1, self.max_quantity.max(1))
    }
}
