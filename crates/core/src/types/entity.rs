//! Resource entities: stores own products and orders, products own items.
//!
//! Prices and totals are `Decimal` in memory and JSON numbers on the wire.
//! With the `postgres` feature, the flat entities decode straight from rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ItemId, OrderId, ProductId, StoreId};

/// A merchant. Root of the resource tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub description: String,
}

/// A catalog entry belonging to one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// One sellable unit of a product, denormalized with the product's name and price.
///
/// `order_id` is `None` while the item is available and `Some` once it has
/// been assigned to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Item {
    pub id: ItemId,
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub order_id: Option<OrderId>,
}

/// An item as listed inside an [`Order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ItemId,
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// A set of items purchased together.
///
/// `total` is maintained incrementally as items are assigned and unassigned;
/// it is never recomputed from `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub created: DateTime<Utc>,
    pub store_id: StoreId,
    pub items: Vec<OrderItem>,
}
