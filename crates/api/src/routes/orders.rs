//! Customer-facing order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{AggregateId, CustomerId, Money};
use domain::order::{PaymentInfo, RefundInfo, StatusHistoryEntry};
use domain::{
    Address, Aggregate, CancelOrder, Coupon, LineItem, Order, OrderStatus, OrderSummary,
    PriceBreakdown, RequestRefund,
};
use event_store::EventStore;
use projections::CustomerOrderRow;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Default, Deserialize)]
pub struct CancelOrderRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub reason: String,
    #[serde(default)]
    pub amount: Option<Money>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Option<AggregateId>,
    pub order_number: String,
    pub customer_id: Option<CustomerId>,
    pub email: String,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub item_count: u32,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub coupon: Option<Coupon>,
    pub totals: PriceBreakdown,
    pub payment: PaymentInfo,
    pub refund: Option<RefundInfo>,
    pub history: Vec<StatusHistoryEntry>,
    pub created_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            order_number: order.order_number().to_string(),
            customer_id: order.customer_id(),
            email: order.email().to_string(),
            status: order.status(),
            items: order.items().to_vec(),
            item_count: order.total_item_count(),
            shipping_address: order.shipping_address().cloned(),
            billing_address: order.billing_address().cloned(),
            coupon: order.coupon().cloned(),
            totals: order.totals(),
            payment: order.payment().clone(),
            refund: order.refund().cloned(),
            history: order.history().to_vec(),
            created_at: order.created_at(),
            shipped_at: order.shipped_at(),
            delivered_at: order.delivered_at(),
            estimated_delivery: order.estimated_delivery(),
            cancelled_at: order.cancelled_at(),
        }
    }
}

// -- Handlers --

/// GET /orders: the caller's orders, newest first. Administrators see all.
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
) -> Result<Json<Vec<CustomerOrderRow>>, ApiError> {
    let rows = if caller.is_admin() {
        state.refresh_views().await?;
        state.customer_orders.all().await
    } else {
        let customer_id = caller.require_customer()?;
        state.refresh_views().await?;
        state.customer_orders.orders_for(customer_id).await
    };
    Ok(Json(rows))
}

/// GET /orders/{id}
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(id): Path<AggregateId>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.get_order(&caller, id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// GET /orders/{id}/summary
pub async fn summary<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(id): Path<AggregateId>,
) -> Result<Json<OrderSummary>, ApiError> {
    let summary = state.orders.summary(&caller, id).await?;
    Ok(Json(summary))
}

/// POST /orders/{id}/cancel
pub async fn cancel<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(id): Path<AggregateId>,
    body: Option<Json<CancelOrderRequest>>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Json(request) = body.unwrap_or_default();
    let order = state
        .orders
        .cancel(&caller, CancelOrder::new(id, request.reason))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/{id}/refund
pub async fn request_refund<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(id): Path<AggregateId>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .orders
        .request_refund(&caller, RequestRefund::new(id, request.reason, request.amount))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// DELETE /orders/{id}
pub async fn discard<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Path(id): Path<AggregateId>,
) -> Result<StatusCode, ApiError> {
    state.orders.discard(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
