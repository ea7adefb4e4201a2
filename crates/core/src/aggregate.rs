//! Folding flat order rows into nested orders.
//!
//! The order queries join `orders`, `items` and `products`, producing one row
//! per item. This module groups those rows back under their order:
//!
//! ```text
//! (order 1, item 10) ─┐
//! (order 1, item 11) ─┼─> Order 1 { items: [10, 11] }
//! (order 2, item 12) ─┴─> Order 2 { items: [12] }
//! ```
//!
//! The first row seen for an order fixes its scalar fields (`total`,
//! `created`, `store_id`); later rows only append items. Items keep the order
//! the rows arrived in. Because the query is an inner join, an order with no
//! items produces no rows and never appears in the result.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::{Serialize, Serializer};

use crate::types::{ItemId, Order, OrderId, OrderItem, ProductId, StoreId};

/// One row of the `orders ⋈ items ⋈ products` join.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct OrderRow {
    pub order_id: OrderId,
    pub total: Decimal,
    pub created: DateTime<Utc>,
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_price: Decimal,
}

impl OrderRow {
    /// Split the row into its order header (with an empty item list) and its item.
    fn into_parts(self) -> (Order, OrderItem) {
        let item = OrderItem {
            id: self.item_id,
            product_id: self.product_id,
            store_id: self.store_id,
            name: self.product_name,
            price: self.product_price,
        };
        let order = Order {
            id: self.order_id,
            total: self.total,
            created: self.created,
            store_id: self.store_id,
            items: Vec::new(),
        };
        (order, item)
    }
}

/// Orders keyed by id, iterated in the order each id was first seen.
///
/// Serializes as a JSON object: `{"1": {...}, "2": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderMap {
    orders: Vec<Order>,
    index: HashMap<OrderId, usize>,
}

impl OrderMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one row into the map.
    ///
    /// Creates the order on first sight of its id, otherwise appends the
    /// row's item to the existing order without touching its scalar fields.
    pub fn push(&mut self, row: OrderRow) {
        let (header, item) = row.into_parts();

        if let Some(order) = self
            .index
            .get(&header.id)
            .and_then(|&position| self.orders.get_mut(position))
        {
            order.items.push(item);
            return;
        }

        let mut order = header;
        order.items.push(item);
        self.index.insert(order.id, self.orders.len());
        self.orders.push(order);
    }

    /// Look up an order by id.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.index
            .get(&id)
            .and_then(|&position| self.orders.get(position))
    }

    /// Number of distinct orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether no rows have been folded in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Iterate over orders in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}

impl Serialize for OrderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.orders.iter().map(|order| (order.id, order)))
    }
}

/// Accumulator for a query that targets a single order.
///
/// Same folding rule as [`OrderMap`] with one "current" order instead of a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingleOrder {
    current: Option<Order>,
}

impl SingleOrder {
    /// Create an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Fold one row in.
    pub fn push(&mut self, row: OrderRow) {
        let (header, item) = row.into_parts();
        self.current.get_or_insert(header).items.push(item);
    }

    /// The order, or `None` if no rows were seen.
    #[must_use]
    pub fn finish(self) -> Option<Order> {
        self.current
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn row(order: i32, total: i64, item: i32, product: i32, price: i64) -> OrderRow {
        OrderRow {
            order_id: OrderId::new(order),
            total: Decimal::new(total, 2),
            created: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            store_id: StoreId::new(1),
            item_id: ItemId::new(item),
            product_id: ProductId::new(product),
            product_name: format!("product-{product}"),
            product_price: Decimal::new(price, 2),
        }
    }

    fn fold(rows: Vec<OrderRow>) -> OrderMap {
        let mut map = OrderMap::new();
        for row in rows {
            map.push(row);
        }
        map
    }

    fn fold_single(rows: Vec<OrderRow>) -> Option<Order> {
        let mut single = SingleOrder::new();
        for row in rows {
            single.push(row);
        }
        single.finish()
    }

    #[test]
    fn test_groups_rows_by_order_in_input_order() {
        let rows = vec![
            row(1, 1500, 10, 100, 500),
            row(2, 999, 20, 101, 999),
            row(1, 1500, 11, 102, 1000),
            row(1, 1500, 12, 100, 500),
        ];

        let map = fold(rows);
        assert_eq!(map.len(), 2);

        let first = map.get(OrderId::new(1)).unwrap();
        let ids: Vec<i32> = first.items.iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert_eq!(first.items[1].name, "product-102");

        let second = map.get(OrderId::new(2)).unwrap();
        assert_eq!(second.items.len(), 1);

        let order_ids: Vec<i32> = map.iter().map(|o| o.id.as_i32()).collect();
        assert_eq!(order_ids, vec![1, 2]);
    }

    #[test]
    fn test_first_row_fixes_scalar_fields() {
        let mut later = row(1, 9900, 11, 100, 500);
        later.created = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let map = fold(vec![row(1, 1500, 10, 100, 500), later]);
        let order = map.get(OrderId::new(1)).unwrap();

        assert_eq!(order.total, Decimal::new(1500, 2));
        assert_eq!(
            order.created,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(fold(Vec::new()).is_empty());
        assert!(fold_single(Vec::new()).is_none());
    }

    #[test]
    fn test_single_order_collects_every_row() {
        let order = fold_single(vec![
            row(4, 2000, 40, 100, 1000),
            row(4, 2000, 41, 100, 1000),
        ])
        .unwrap();

        assert_eq!(order.id, OrderId::new(4));
        assert_eq!(order.total, Decimal::new(2000, 2));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].id, ItemId::new(40));
    }

    #[test]
    fn test_serializes_as_object_keyed_by_order_id() {
        let map = fold(vec![row(7, 500, 70, 100, 500), row(3, 500, 30, 100, 500)]);

        let json = serde_json::to_value(&map).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["7"]["items"][0]["id"], serde_json::json!(70));
        assert_eq!(object["3"]["total"], serde_json::json!(5.0));
        assert_eq!(object["3"]["store_id"], serde_json::json!(1));
    }
}
