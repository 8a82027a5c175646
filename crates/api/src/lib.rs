//! HTTP API for the storefront order core.
//!
//! Cart, checkout, order, refund and catalog endpoints over the event-sourced
//! domain, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, LogFormat};
pub use error::ApiError;
pub use identity::Identity;
pub use state::{AppState, Collaborators};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    use routes::{admin, cart, checkout, orders, products};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(cart::get::<S>).delete(cart::clear::<S>))
        .route("/cart/items", post(cart::add_item::<S>))
        .route(
            "/cart/items/{item_id}",
            patch(cart::update_item::<S>).delete(cart::remove_item::<S>),
        )
        .route(
            "/cart/coupon",
            post(cart::apply_coupon::<S>).delete(cart::remove_coupon::<S>),
        )
        .route(
            "/cart/shipping-address",
            put(cart::set_shipping_address::<S>),
        )
        .route("/checkout", post(checkout::checkout::<S>))
        .route("/payments/webhook", post(checkout::payment_webhook::<S>))
        .route("/orders", get(orders::list::<S>))
        .route(
            "/orders/{id}",
            get(orders::get::<S>).delete(orders::discard::<S>),
        )
        .route("/orders/{id}/summary", get(orders::summary::<S>))
        .route("/orders/{id}/cancel", post(orders::cancel::<S>))
        .route("/orders/{id}/refund", post(orders::request_refund::<S>))
        .route("/products/{id}", get(products::get::<S>))
        .route("/admin/dashboard", get(admin::dashboard::<S>))
        .route(
            "/admin/orders/{id}/status",
            patch(admin::update_status::<S>),
        )
        .route(
            "/admin/orders/{id}/refund/approve",
            post(admin::approve_refund::<S>),
        )
        .route(
            "/admin/orders/{id}/refund/reject",
            post(admin::reject_refund::<S>),
        )
        .route("/admin/products", post(admin::create_product::<S>))
        .route("/admin/products/{id}", patch(admin::update_product::<S>))
        .route("/admin/products/{id}/restock", post(admin::restock::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the application state over `store` with the default in-process
/// collaborators and the configured currency.
pub async fn create_default_state<S: EventStore + Clone + 'static>(
    store: S,
    config: &Config,
) -> projections::Result<Arc<AppState<S>>> {
    let collaborators = Collaborators {
        currency: config.currency.clone(),
        ..Collaborators::default()
    };
    Ok(Arc::new(AppState::new(store, collaborators).await?))
}
