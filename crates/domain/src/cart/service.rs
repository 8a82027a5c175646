//! Cart service.

use std::sync::Arc;

use chrono::Utc;
use common::{AggregateId, CustomerId, ProductId};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::catalog::ProductLookup;
use crate::command::CommandHandler;
use crate::coupon::CouponRepository;
use crate::error::DomainError;
use crate::line_item::{LineItemId, VariantSelector};

use super::{Cart, CartError, CartEvent};

/// Stream id of a customer's cart. Each customer has exactly one.
pub fn cart_id(customer_id: CustomerId) -> AggregateId {
    AggregateId::derived("cart", &customer_id.to_string())
}

/// Request to put a product in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub variant: Option<VariantSelector>,
}

/// Runs cart commands for a customer, opening the cart on first use.
pub struct CartService<S: EventStore> {
    handler: CommandHandler<S, Cart>,
    catalog: Arc<dyn ProductLookup>,
    coupons: Arc<dyn CouponRepository>,
}

impl<S: EventStore> CartService<S> {
    pub fn new(
        store: S,
        catalog: Arc<dyn ProductLookup>,
        coupons: Arc<dyn CouponRepository>,
    ) -> Self {
        Self {
            handler: CommandHandler::new(store),
            catalog,
            coupons,
        }
    }

    /// Returns the customer's cart; an empty one if it was never used.
    pub async fn get_cart(&self, customer_id: CustomerId) -> Result<Cart, DomainError> {
        self.handler.load(cart_id(customer_id)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        customer_id: CustomerId,
        request: AddCartItem,
    ) -> Result<Cart, DomainError> {
        let product = self
            .catalog
            .find_product(request.product_id)
            .await?
            .ok_or(CartError::ProductNotFound(request.product_id))?;

        self.mutate(customer_id, |cart| {
            cart.add_item(&product, request.quantity, request.variant, Utc::now())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        customer_id: CustomerId,
        item_id: LineItemId,
        quantity: u32,
    ) -> Result<Cart, DomainError> {
        self.mutate(customer_id, |cart| {
            cart.update_item_quantity(item_id, quantity, Utc::now())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        customer_id: CustomerId,
        item_id: LineItemId,
    ) -> Result<Cart, DomainError> {
        self.mutate(customer_id, |cart| cart.remove_item(item_id, Utc::now()))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, customer_id: CustomerId) -> Result<Cart, DomainError> {
        self.mutate(customer_id, |cart| cart.clear(Utc::now())).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn apply_coupon(
        &self,
        customer_id: CustomerId,
        code: &str,
    ) -> Result<Cart, DomainError> {
        let coupon = self
            .coupons
            .find_by_code(code)
            .await?
            .ok_or_else(|| CartError::InvalidCoupon(code.to_string()))?;

        self.mutate(customer_id, |cart| cart.apply_coupon(coupon, Utc::now()))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_coupon(&self, customer_id: CustomerId) -> Result<Cart, DomainError> {
        self.mutate(customer_id, |cart| cart.remove_coupon(Utc::now()))
            .await
    }

    #[tracing::instrument(skip(self, address))]
    pub async fn set_shipping_address(
        &self,
        customer_id: CustomerId,
        address: Address,
    ) -> Result<Cart, DomainError> {
        self.mutate(customer_id, |cart| {
            cart.set_shipping_address(address, Utc::now())
        })
        .await
    }

    /// Empties the cart after its contents became `order_id`.
    #[tracing::instrument(skip(self))]
    pub async fn check_out(
        &self,
        customer_id: CustomerId,
        order_id: AggregateId,
    ) -> Result<Cart, DomainError> {
        self.mutate(customer_id, |cart| cart.check_out(order_id, Utc::now()))
            .await
    }

    async fn mutate<F>(&self, customer_id: CustomerId, command: F) -> Result<Cart, DomainError>
    where
        F: FnOnce(&Cart) -> Result<Vec<CartEvent>, CartError>,
    {
        let id = cart_id(customer_id);
        let result = self
            .handler
            .execute(id, |cart| {
                let mut events = cart.open(id, customer_id, Utc::now());
                events.extend(command(cart)?);
                Ok(events)
            })
            .await?;
        Ok(result.aggregate)
    }
}
