//! Order handlers.
//!
//! Listing returns a JSON object keyed by order id; orders with no items are
//! absent from both the listing and single lookups.

use axum::{Json, extract::State};
use tracing::instrument;

use stockroom_core::Order;
use stockroom_core::aggregate::OrderMap;

use super::extract::{OrderPath, StoreScope};
use super::response::Envelope;
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /stores/{storeid}/orders`
#[instrument(skip_all, fields(store_id = %scope.store_id))]
pub async fn index(State(state): State<AppState>, scope: StoreScope) -> Result<Json<OrderMap>> {
    let orders = OrderRepository::new(state.pool())
        .list(scope.store_id)
        .await?;
    Ok(Json(orders))
}

/// `GET /stores/{storeid}/orders/{orderid}`
#[instrument(skip_all, fields(order_id = %path.order_id))]
pub async fn show(State(state): State<AppState>, path: OrderPath) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get(path.store_id, path.order_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// `POST /stores/{storeid}/orders`
#[instrument(skip_all, fields(store_id = %scope.store_id))]
pub async fn create(State(state): State<AppState>, scope: StoreScope) -> Result<Envelope> {
    let id = OrderRepository::new(state.pool())
        .create(scope.store_id)
        .await?;
    Ok(Envelope::created(id))
}

/// `DELETE /stores/{storeid}/orders/{orderid}`
#[instrument(skip_all, fields(order_id = %path.order_id))]
pub async fn delete(State(state): State<AppState>, path: OrderPath) -> Result<Envelope> {
    OrderRepository::new(state.pool())
        .delete(path.store_id, path.order_id)
        .await?;
    Ok(Envelope::ok())
}
