//! Shopping cart endpoints. Signed-in customers only.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use common::CustomerId;
use domain::{AddCartItem, Address, Cart, Coupon, LineItem, LineItemId, PriceBreakdown};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub customer_id: CustomerId,
    pub items: Vec<LineItem>,
    pub item_count: u32,
    pub coupon: Option<Coupon>,
    pub shipping_address: Option<Address>,
    pub totals: PriceBreakdown,
    pub last_updated: Option<DateTime<Utc>>,
}

impl CartResponse {
    fn new(customer_id: CustomerId, cart: &Cart) -> Self {
        Self {
            customer_id,
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            coupon: cart.coupon().cloned(),
            shipping_address: cart.shipping_address().cloned(),
            totals: cart.totals(),
            last_updated: cart.last_updated(),
        }
    }
}

type CartResult = Result<Json<CartResponse>, ApiError>;

fn respond(customer_id: CustomerId, cart: &Cart) -> CartResult {
    Ok(Json(CartResponse::new(customer_id, cart)))
}

// -- Handlers --

/// GET /cart
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
) -> CartResult {
    let customer_id = caller.require_customer()?;
    let cart = state.carts.get_cart(customer_id).await?;
    respond(customer_id, &cart)
}

/// DELETE /cart
pub async fn clear<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
) -> CartResult {
    let customer_id = caller.require_customer()?;
    let cart = state.carts.clear(customer_id).await?;
    respond(customer_id, &cart)
}

/// POST /cart/items
pub async fn add_item<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Json(request): Json<AddCartItem>,
) -> CartResult {
    let customer_id = caller.require_customer()?;
    let cart = state.carts.add_item(customer_id, request).await?;
    respond(customer_id, &cart)
}

/// PATCH /cart/items/{item_id}
pub async fn update_item<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(item_id): Path<LineItemId>,
    Json(request): Json<UpdateQuantityRequest>,
) -> CartResult {
    let customer_id = caller.require_customer()?;
    let cart = state
        .carts
        .update_item_quantity(customer_id, item_id, request.quantity)
        .await?;
    respond(customer_id, &cart)
}

/// DELETE /cart/items/{item_id}
pub async fn remove_item<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(item_id): Path<LineItemId>,
) -> CartResult {
    let customer_id = caller.require_customer()?;
    let cart = state.carts.remove_item(customer_id, item_id).await?;
    respond(customer_id, &cart)
}

/// POST /cart/coupon
pub async fn apply_coupon<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Json(request): Json<ApplyCouponRequest>,
) -> CartResult {
    let customer_id = caller.require_customer()?;
    let cart = state.carts.apply_coupon(customer_id, &request.code).await?;
    respond(customer_id, &cart)
}

/// DELETE /cart/coupon
pub async fn remove_coupon<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
) -> CartResult {
    let customer_id = caller.require_customer()?;
    let cart = state.carts.remove_coupon(customer_id).await?;
    respond(customer_id, &cart)
}

/// PUT /cart/shipping-address
pub async fn set_shipping_address<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Json(address): Json<Address>,
) -> CartResult {
    let customer_id = caller.require_customer()?;
    let cart = state.carts.set_shipping_address(customer_id, address).await?;
    respond(customer_id, &cart)
}
