//! Item handlers, including the order assignment endpoints.
//!
//! `POST .../items/{itemid}/order?id=` assigns the item to the order and
//! `DELETE` on the same path unassigns it; the verb alone picks the direction.

use axum::{Json, extract::State};
use tracing::instrument;

use stockroom_core::Item;
use stockroom_core::assignment::{AssignmentRequest, ItemKey, Transition};

use super::extract::{ItemPath, OrderQuery, ProductScope};
use super::response::Envelope;
use crate::db::{ItemRepository, ledger};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /stores/{storeid}/products/{productid}/items`
#[instrument(skip_all, fields(product_id = %scope.product_id))]
pub async fn index(State(state): State<AppState>, scope: ProductScope) -> Result<Json<Vec<Item>>> {
    let items = ItemRepository::new(state.pool())
        .list(scope.store_id, scope.product_id)
        .await?;
    Ok(Json(items))
}

/// `GET /stores/{storeid}/products/{productid}/items/{itemid}`
#[instrument(skip_all, fields(item_id = %path.item_id))]
pub async fn show(State(state): State<AppState>, path: ItemPath) -> Result<Json<Item>> {
    ItemRepository::new(state.pool())
        .get(path.store_id, path.product_id, path.item_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// `POST /stores/{storeid}/products/{productid}/items`
#[instrument(skip_all, fields(product_id = %scope.product_id))]
pub async fn create(State(state): State<AppState>, scope: ProductScope) -> Result<Envelope> {
    let id = ItemRepository::new(state.pool())
        .create(scope.store_id, scope.product_id)
        .await?;
    Ok(Envelope::created(id))
}

/// `DELETE /stores/{storeid}/products/{productid}/items/{itemid}`
#[instrument(skip_all, fields(item_id = %path.item_id))]
pub async fn delete(State(state): State<AppState>, path: ItemPath) -> Result<Envelope> {
    ItemRepository::new(state.pool())
        .delete(path.store_id, path.product_id, path.item_id)
        .await?;
    Ok(Envelope::ok())
}

/// `POST /stores/{storeid}/products/{productid}/items/{itemid}/order?id={orderid}`
#[instrument(skip_all, fields(item_id = %path.item_id, order_id = %query.order_id))]
pub async fn assign(
    State(state): State<AppState>,
    path: ItemPath,
    query: OrderQuery,
) -> Result<Envelope> {
    change_membership(&state, path, query, Transition::Assign).await
}

/// `DELETE /stores/{storeid}/products/{productid}/items/{itemid}/order?id={orderid}`
#[instrument(skip_all, fields(item_id = %path.item_id, order_id = %query.order_id))]
pub async fn unassign(
    State(state): State<AppState>,
    path: ItemPath,
    query: OrderQuery,
) -> Result<Envelope> {
    change_membership(&state, path, query, Transition::Unassign).await
}

async fn change_membership(
    state: &AppState,
    path: ItemPath,
    query: OrderQuery,
    transition: Transition,
) -> Result<Envelope> {
    let request = AssignmentRequest {
        item: ItemKey {
            item_id: path.item_id,
            store_id: path.store_id,
            product_id: path.product_id,
        },
        order_id: query.order_id,
        transition,
    };

    ledger::run(state.pool(), state.assignment_mode(), request).await?;
    Ok(Envelope::ok())
}
