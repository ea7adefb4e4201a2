//! Product handlers, scoped to a store.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use stockroom_core::Product;

use super::extract::{JsonBody, ProductPath, StoreScope};
use super::response::Envelope;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of product create/update. `price` is a JSON number; absent fields are empty/zero.
#[derive(Debug, Default, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// `GET /stores/{storeid}/products`
#[instrument(skip_all, fields(store_id = %scope.store_id))]
pub async fn index(State(state): State<AppState>, scope: StoreScope) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list(scope.store_id)
        .await?;
    Ok(Json(products))
}

/// `GET /stores/{storeid}/products/{productid}`
#[instrument(skip_all, fields(product_id = %path.product_id))]
pub async fn show(State(state): State<AppState>, path: ProductPath) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(path.store_id, path.product_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// `POST /stores/{storeid}/products`
#[instrument(skip_all, fields(store_id = %scope.store_id))]
pub async fn create(
    State(state): State<AppState>,
    scope: StoreScope,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<Envelope> {
    let id = ProductRepository::new(state.pool())
        .create(scope.store_id, &input.name, input.price)
        .await?;
    Ok(Envelope::created(id))
}

/// `PATCH /stores/{storeid}/products/{productid}`
#[instrument(skip_all, fields(product_id = %path.product_id))]
pub async fn update(
    State(state): State<AppState>,
    path: ProductPath,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<Envelope> {
    ProductRepository::new(state.pool())
        .update(path.store_id, path.product_id, &input.name, input.price)
        .await?;
    Ok(Envelope::ok())
}

/// `DELETE /stores/{storeid}/products/{productid}`
#[instrument(skip_all, fields(product_id = %path.product_id))]
pub async fn delete(State(state): State<AppState>, path: ProductPath) -> Result<Envelope> {
    ProductRepository::new(state.pool())
        .delete(path.store_id, path.product_id)
        .await?;
    Ok(Envelope::ok())
}
