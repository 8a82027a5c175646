//! Product aggregate.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use common::{AggregateId, Money, ProductId};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::line_item::VariantSelector;

use super::{CatalogError, ProductSnapshot, StockReservation, Variant};

/// Events that can occur on a product stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    ProductListed(ProductListedData),
    ProductUpdated(ProductUpdatedData),
    StockRestocked(StockRestockedData),
    StockReserved(StockMovementData),
    StockReleased(StockMovementData),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductListed(_) => "ProductListed",
            ProductEvent::ProductUpdated(_) => "ProductUpdated",
            ProductEvent::StockRestocked(_) => "StockRestocked",
            ProductEvent::StockReserved(_) => "StockReserved",
            ProductEvent::StockReleased(_) => "StockReleased",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListedData {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub images: Vec<String>,
    pub stock: u32,
    pub variants: Vec<Variant>,
    pub active: bool,
    pub listed_at: DateTime<Utc>,
}

/// Fields left as `None` are unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdatedData {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub images: Option<Vec<String>>,
    pub active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRestockedData {
    pub variant: Option<VariantSelector>,
    pub quantity: u32,
    pub restocked_at: DateTime<Utc>,
}

/// A reservation or its release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovementData {
    pub key: String,
    pub variant: Option<VariantSelector>,
    pub quantity: u32,
    pub at: DateTime<Utc>,
}

/// Input for listing a new product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A partial product edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub images: Option<Vec<String>>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HeldStock {
    variant: Option<VariantSelector>,
    quantity: u32,
}

/// A catalog product with its stock and outstanding reservations.
#[derive(Debug, Clone, Default)]
pub struct Product {
    id: Option<AggregateId>,
    version: Version,
    product_id: Option<ProductId>,
    name: String,
    price: Money,
    images: Vec<String>,
    stock: u32,
    variants: Vec<Variant>,
    active: bool,
    reservations: HashMap<String, HeldStock>,
    released: HashSet<String>,
}

impl Aggregate for Product {
    type Event = ProductEvent;
    type Error = CatalogError;

    fn aggregate_type() -> &'static str {
        "Product"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            ProductEvent::ProductListed(data) => {
                self.id = Some(data.product_id.into());
                self.product_id = Some(data.product_id);
                self.name = data.name;
                self.price = data.price;
                self.images = data.images;
                self.stock = data.stock;
                self.variants = data.variants;
                self.active = data.active;
            }
            ProductEvent::ProductUpdated(data) => {
                if let Some(name) = data.name {
                    self.name = name;
                }
                if let Some(price) = data.price {
                    self.price = price;
                }
                if let Some(images) = data.images {
                    self.images = images;
                }
                if let Some(active) = data.active {
                    self.active = active;
                }
            }
            ProductEvent::StockRestocked(data) => {
                let slot = self.stock_slot(data.variant.as_ref());
                *slot = slot.saturating_add(data.quantity);
            }
            ProductEvent::StockReserved(data) => {
                let slot = self.stock_slot(data.variant.as_ref());
                *slot = slot.saturating_sub(data.quantity);
                self.reservations.insert(
                    data.key,
                    HeldStock {
                        variant: data.variant,
                        quantity: data.quantity,
                    },
                );
            }
            ProductEvent::StockReleased(data) => {
                let slot = self.stock_slot(data.variant.as_ref());
                *slot = slot.saturating_add(data.quantity);
                self.reservations.remove(&data.key);
                self.released.insert(data.key);
            }
        }
    }
}

// Query methods
impl Product {
    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Quantity currently held under `key`, if any.
    pub fn reserved_under(&self, key: &str) -> Option<u32> {
        self.reservations.get(key).map(|held| held.quantity)
    }

    pub fn snapshot(&self) -> Option<ProductSnapshot> {
        Some(ProductSnapshot {
            id: self.product_id?,
            name: self.name.clone(),
            price: self.price,
            image_url: self.images.first().cloned(),
            stock: self.stock,
            variants: self.variants.clone(),
            active: self.active,
        })
    }

    fn stock_on_hand(&self, variant: Option<&VariantSelector>) -> u32 {
        variant
            .and_then(|s| self.variants.iter().find(|v| v.matches(s)))
            .map_or(self.stock, |v| v.stock)
    }

    /// Stock counter for a variant, or the top-level counter.
    /// Events are only recorded for variants that exist.
    fn stock_slot(&mut self, variant: Option<&VariantSelector>) -> &mut u32 {
        match variant.and_then(|s| self.variants.iter().position(|v| v.matches(s))) {
            Some(index) => &mut self.variants[index].stock,
            None => &mut self.stock,
        }
    }

    fn ensure_listed(&self) -> Result<ProductId, CatalogError> {
        self.product_id.ok_or(CatalogError::NotListed)
    }

    fn ensure_variant(&self, variant: Option<&VariantSelector>) -> Result<(), CatalogError> {
        match variant {
            Some(selector) if !self.variants.iter().any(|v| v.matches(selector)) => {
                Err(CatalogError::VariantNotFound(selector.clone()))
            }
            _ => Ok(()),
        }
    }
}

// Command methods (return events)
impl Product {
    pub fn list(
        &self,
        product_id: ProductId,
        new: NewProduct,
        at: DateTime<Utc>,
    ) -> Result<Vec<ProductEvent>, CatalogError> {
        if self.product_id.is_some() {
            return Err(CatalogError::AlreadyListed);
        }
        if new.name.trim().is_empty() {
            return Err(CatalogError::BlankName);
        }
        if !new.price.is_positive() {
            return Err(CatalogError::InvalidPrice(new.price));
        }
        for (i, variant) in new.variants.iter().enumerate() {
            let selector = variant.selector();
            if new.variants[..i].iter().any(|v| v.matches(&selector)) {
                return Err(CatalogError::DuplicateVariant(selector));
            }
        }

        Ok(vec![ProductEvent::ProductListed(ProductListedData {
            product_id,
            name: new.name,
            price: new.price,
            images: new.images,
            stock: new.stock,
            variants: new.variants,
            active: new.active,
            listed_at: at,
        })])
    }

    pub fn update(
        &self,
        update: ProductUpdate,
        at: DateTime<Utc>,
    ) -> Result<Vec<ProductEvent>, CatalogError> {
        self.ensure_listed()?;
        if let Some(name) = &update.name
            && name.trim().is_empty()
        {
            return Err(CatalogError::BlankName);
        }
        if let Some(price) = update.price
            && !price.is_positive()
        {
            return Err(CatalogError::InvalidPrice(price));
        }
        if update.name.is_none()
            && update.price.is_none()
            && update.images.is_none()
            && update.active.is_none()
        {
            return Ok(vec![]);
        }

        Ok(vec![ProductEvent::ProductUpdated(ProductUpdatedData {
            name: update.name,
            price: update.price,
            images: update.images,
            active: update.active,
            updated_at: at,
        })])
    }

    pub fn restock(
        &self,
        variant: Option<VariantSelector>,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> Result<Vec<ProductEvent>, CatalogError> {
        self.ensure_listed()?;
        if quantity == 0 {
            return Err(CatalogError::InvalidQuantity(quantity));
        }
        self.ensure_variant(variant.as_ref())?;
        if self.stock_on_hand(variant.as_ref()).checked_add(quantity).is_none() {
            return Err(CatalogError::InvalidQuantity(quantity));
        }

        Ok(vec![ProductEvent::StockRestocked(StockRestockedData {
            variant,
            quantity,
            restocked_at: at,
        })])
    }

    /// Takes stock for a reservation. A key that was already reserved or
    /// already released is a no-op.
    pub fn reserve(
        &self,
        reservation: &StockReservation,
        at: DateTime<Utc>,
    ) -> Result<Vec<ProductEvent>, CatalogError> {
        self.ensure_listed()?;
        if self.reservations.contains_key(&reservation.key)
            || self.released.contains(&reservation.key)
        {
            return Ok(vec![]);
        }
        if reservation.quantity == 0 {
            return Err(CatalogError::InvalidQuantity(reservation.quantity));
        }
        self.ensure_variant(reservation.variant.as_ref())?;

        Ok(vec![ProductEvent::StockReserved(StockMovementData {
            key: reservation.key.clone(),
            variant: reservation.variant.clone(),
            quantity: reservation.quantity,
            at,
        })])
    }

    /// Returns the stock held under `key`. Unknown or already released keys
    /// are a no-op.
    pub fn release(&self, key: &str, at: DateTime<Utc>) -> Result<Vec<ProductEvent>, CatalogError> {
        self.ensure_listed()?;
        let Some(held) = self.reservations.get(key) else {
            return Ok(vec![]);
        };

        Ok(vec![ProductEvent::StockReleased(StockMovementData {
            key: key.to_string(),
            variant: held.variant.clone(),
            quantity: held.quantity,
            at,
        })])
    }
}
