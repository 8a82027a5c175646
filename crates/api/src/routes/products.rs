//! Public product lookup.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{Money, ProductId};
use domain::{Product, Variant};
use event_store::EventStore;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Option<ProductId>,
    pub name: String,
    pub price: Money,
    pub images: Vec<String>,
    pub stock: u32,
    pub variants: Vec<Variant>,
    pub active: bool,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.product_id(),
            name: product.name().to_string(),
            price: product.price(),
            images: product.images().to_vec(),
            stock: product.stock(),
            variants: product.variants().to_vec(),
            active: product.is_active(),
        }
    }
}

/// GET /products/{id}
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get_product(id).await?;
    Ok(Json(ProductResponse::from(&product)))
}
