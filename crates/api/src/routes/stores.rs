//! Store handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use stockroom_core::Store;

use super::extract::{JsonBody, StorePath};
use super::response::Envelope;
use crate::db::StoreRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of `POST /stores` and `PATCH /stores/{storeid}`. Absent fields are empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreInput {
    pub name: String,
    pub description: String,
}

/// `GET /stores`
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Store>>> {
    let stores = StoreRepository::new(state.pool()).list().await?;
    Ok(Json(stores))
}

/// `GET /stores/{storeid}`
#[instrument(skip_all, fields(store_id = %path.store_id))]
pub async fn show(State(state): State<AppState>, path: StorePath) -> Result<Json<Store>> {
    StoreRepository::new(state.pool())
        .get(path.store_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// `POST /stores`
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<StoreInput>,
) -> Result<Envelope> {
    let id = StoreRepository::new(state.pool())
        .create(&input.name, &input.description)
        .await?;
    Ok(Envelope::created(id))
}

/// `PATCH /stores/{storeid}`
#[instrument(skip_all, fields(store_id = %path.store_id))]
pub async fn update(
    State(state): State<AppState>,
    path: StorePath,
    JsonBody(input): JsonBody<StoreInput>,
) -> Result<Envelope> {
    StoreRepository::new(state.pool())
        .update(path.store_id, &input.name, &input.description)
        .await?;
    Ok(Envelope::ok())
}

/// `DELETE /stores/{storeid}`
#[instrument(skip_all, fields(store_id = %path.store_id))]
pub async fn delete(State(state): State<AppState>, path: StorePath) -> Result<Envelope> {
    StoreRepository::new(state.pool()).delete(path.store_id).await?;
    Ok(Envelope::ok())
}
