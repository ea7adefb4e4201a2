//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /stores                                   - List stores
//! POST   /stores                                   - Create store
//! GET    /stores/{storeid}                         - Get store
//! PATCH  /stores/{storeid}                         - Update store
//! DELETE /stores/{storeid}                         - Delete store
//!
//! # Products
//! GET    /stores/{storeid}/products                - List products
//! POST   /stores/{storeid}/products                - Create product
//! GET    /stores/{storeid}/products/{productid}    - Get product
//! PATCH  /stores/{storeid}/products/{productid}    - Update product
//! DELETE /stores/{storeid}/products/{productid}    - Delete product
//!
//! # Items (under /stores/{storeid}/products/{productid})
//! GET    /items                                    - List items
//! POST   /items                                    - Create item
//! GET    /items/{itemid}                           - Get item
//! DELETE /items/{itemid}                           - Delete item
//! POST   /items/{itemid}/order?id={orderid}        - Assign item to order
//! DELETE /items/{itemid}/order?id={orderid}        - Unassign item from order
//!
//! # Orders
//! GET    /stores/{storeid}/orders                  - List orders (keyed by id)
//! POST   /stores/{storeid}/orders                  - Create order
//! GET    /stores/{storeid}/orders/{orderid}        - Get order
//! DELETE /stores/{storeid}/orders/{orderid}        - Delete order
//! ```

pub mod extract;
pub mod items;
pub mod orders;
pub mod products;
pub mod response;
pub mod stores;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(items::index).post(items::create))
        .route("/{itemid}", get(items::show).delete(items::delete))
        .route("/{itemid}/order", post(items::assign).delete(items::unassign))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{productid}",
            get(products::show)
                .patch(products::update)
                .delete(products::delete),
        )
        .nest("/{productid}/items", item_routes())
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{orderid}", get(orders::show).delete(orders::delete))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::index).post(stores::create))
        .route(
            "/{storeid}",
            get(stores::show)
                .patch(stores::update)
                .delete(stores::delete),
        )
        .nest("/{storeid}/products", product_routes())
        .nest("/{storeid}/orders", order_routes())
}

/// Create all resource routes.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/stores", store_routes())
}
