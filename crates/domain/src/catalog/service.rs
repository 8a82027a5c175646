//! Catalog service: product administration plus the lookup and inventory
//! collaborators used by carts, orders and checkout.

use async_trait::async_trait;
use chrono::Utc;
use common::ProductId;
use event_store::EventStore;

use crate::command::CommandHandler;
use crate::error::DomainError;
use crate::line_item::VariantSelector;

use super::{
    InventoryAdjuster, NewProduct, Product, ProductLookup, ProductSnapshot, ProductUpdate,
    StockReservation,
};

pub struct CatalogService<S: EventStore> {
    handler: CommandHandler<S, Product>,
}

impl<S: EventStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Adds a product to the catalog under a fresh id.
    #[tracing::instrument(skip(self, new), fields(name = %new.name))]
    pub async fn list_product(&self, new: NewProduct) -> Result<Product, DomainError> {
        let product_id = ProductId::new();
        let result = self
            .handler
            .execute(product_id.into(), |product| {
                product.list(product_id, new, Utc::now())
            })
            .await?;

        tracing::info!(%product_id, "product listed");
        Ok(result.aggregate)
    }

    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, DomainError> {
        self.handler
            .load_existing(product_id.into())
            .await?
            .ok_or_else(|| DomainError::not_found("Product", product_id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, DomainError> {
        self.get_product(product_id).await?;
        let result = self
            .handler
            .execute_with_retry(product_id.into(), |product| {
                product.update(update.clone(), Utc::now())
            })
            .await?;
        Ok(result.aggregate)
    }

    #[tracing::instrument(skip(self))]
    pub async fn restock(
        &self,
        product_id: ProductId,
        variant: Option<VariantSelector>,
        quantity: u32,
    ) -> Result<Product, DomainError> {
        self.get_product(product_id).await?;
        let result = self
            .handler
            .execute_with_retry(product_id.into(), |product| {
                product.restock(variant.clone(), quantity, Utc::now())
            })
            .await?;
        Ok(result.aggregate)
    }
}

#[async_trait]
impl<S: EventStore> ProductLookup for CatalogService<S> {
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductSnapshot>, DomainError> {
        Ok(self
            .handler
            .load_existing(id.into())
            .await?
            .and_then(|product| product.snapshot()))
    }
}

#[async_trait]
impl<S: EventStore> InventoryAdjuster for CatalogService<S> {
    #[tracing::instrument(skip(self, reservation), fields(key = %reservation.key, product_id = %reservation.product_id))]
    async fn reserve(&self, reservation: &StockReservation) -> Result<(), DomainError> {
        let result = self
            .handler
            .execute_with_retry(reservation.product_id.into(), |product| {
                product.reserve(reservation, Utc::now())
            })
            .await
            .map_err(|err| missing_product(err, reservation.product_id))?;

        if !result.events.is_empty() {
            metrics::counter!("inventory_reservations_total").increment(1);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn release(&self, product_id: ProductId, key: &str) -> Result<(), DomainError> {
        let result = self
            .handler
            .execute_with_retry(product_id.into(), |product| product.release(key, Utc::now()))
            .await
            .map_err(|err| missing_product(err, product_id))?;

        if !result.events.is_empty() {
            metrics::counter!("inventory_releases_total").increment(1);
            tracing::debug!(%product_id, key, "stock released");
        }
        Ok(())
    }
}

fn missing_product(err: DomainError, product_id: ProductId) -> DomainError {
    match err {
        DomainError::Catalog(super::CatalogError::NotListed) => {
            DomainError::not_found("Product", product_id)
        }
        other => other,
    }
}
