//! Checkout and payment-provider endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use checkout::CheckoutRequest;
use common::AggregateId;
use domain::order::PaymentStatus;
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::orders::OrderResponse;
use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: OrderResponse,
    pub client_secret: String,
}

/// Payment provider callback.
#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    pub intent_id: String,
    pub order_id: AggregateId,
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /checkout
pub async fn checkout<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(caller): Identity,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let receipt = state.checkout.checkout(&caller, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order: OrderResponse::from(&receipt.order),
            client_secret: receipt.client_secret,
        }),
    ))
}

/// POST /payments/webhook: records the reported payment status on the order.
/// The order status itself is left alone.
pub async fn payment_webhook<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(event): Json<PaymentWebhook>,
) -> Result<Json<WebhookAck>, ApiError> {
    tracing::info!(
        order_id = %event.order_id,
        intent_id = %event.intent_id,
        status = ?event.status,
        "payment webhook received"
    );
    state
        .orders
        .record_payment_status(event.order_id, event.intent_id, event.status)
        .await?;
    Ok(Json(WebhookAck { received: true }))
}
