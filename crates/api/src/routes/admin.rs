//! Administrator endpoints: order status, refund review, dashboard and
//! catalog maintenance.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{AggregateId, ProductId};
use domain::{
    DomainError, NewProduct, OrderStatus, ProductUpdate, ReviewRefund, UpdateOrderStatus,
    VariantSelector,
};
use event_store::EventStore;
use projections::DashboardSnapshot;
use serde::Deserialize;

use super::orders::OrderResponse;
use super::products::ProductResponse;
use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: u32,
    #[serde(default)]
    pub variant: Option<VariantSelector>,
}

/// PATCH /admin/orders/{id}/status
pub async fn update_status<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(id): Path<AggregateId>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    caller.require_admin()?;
    let status: OrderStatus = request.status.parse().map_err(DomainError::from)?;
    let order = state
        .orders
        .update_status(
            &caller,
            UpdateOrderStatus::new(id, status).with_note(request.note),
        )
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /admin/orders/{id}/refund/approve: approves and pays out the refund.
pub async fn approve_refund<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(id): Path<AggregateId>,
    body: Option<Json<ReviewRequest>>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Json(request) = body.unwrap_or_default();
    let order = state
        .checkout
        .approve_refund(&caller, ReviewRefund::new(id, request.note))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /admin/orders/{id}/refund/reject
pub async fn reject_refund<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(id): Path<AggregateId>,
    body: Option<Json<ReviewRequest>>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Json(request) = body.unwrap_or_default();
    let order = state
        .orders
        .reject_refund(&caller, ReviewRefund::new(id, request.note))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// GET /admin/dashboard
pub async fn dashboard<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    caller.require_admin()?;
    state.refresh_views().await?;
    Ok(Json(state.dashboard.snapshot().await))
}

/// POST /admin/products
pub async fn create_product<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Json(request): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    caller.require_admin()?;
    let product = state.catalog.list_product(request).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(&product))))
}

/// PATCH /admin/products/{id}
pub async fn update_product<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(id): Path<ProductId>,
    Json(request): Json<ProductUpdate>,
) -> Result<Json<ProductResponse>, ApiError> {
    caller.require_admin()?;
    let product = state.catalog.update_product(id, request).await?;
    Ok(Json(ProductResponse::from(&product)))
}

/// POST /admin/products/{id}/restock
pub async fn restock<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(id): Path<ProductId>,
    Json(request): Json<RestockRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    caller.require_admin()?;
    let product = state
        .catalog
        .restock(id, request.variant, request.quantity)
        .await?;
    Ok(Json(ProductResponse::from(&product)))
}
