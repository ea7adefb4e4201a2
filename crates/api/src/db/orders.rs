//! Order repository.
//!
//! Reads go through the `orders ⋈ items ⋈ products` join and are folded into
//! nested orders as the rows stream in (see [`stockroom_core::aggregate`]).
//! Orders without items are not returned by the join.

use futures::{Stream, TryStreamExt};
use sqlx::PgPool;

use stockroom_core::aggregate::{OrderMap, OrderRow, SingleOrder};
use stockroom_core::{Order, OrderId, StoreId};

use super::{LIST_LIMIT, RepositoryError, expect_row};

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a store's orders with their items.
    ///
    /// The row cap applies to joined rows (one per item), not to orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a row fails to decode.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, store_id: StoreId) -> Result<OrderMap, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT orders.id AS order_id, orders.total, orders.created, orders.store_id,
                   items.id AS item_id, items.product_id,
                   products.name AS product_name, products.price AS product_price
            FROM orders
            JOIN items ON items.order_id = orders.id
            JOIN products ON products.id = items.product_id
            WHERE orders.store_id = $1
            ORDER BY orders.id, items.id
            LIMIT $2
            ",
        )
        .bind(store_id)
        .bind(LIST_LIMIT)
        .fetch(self.pool);

        collect_orders(rows).await
    }

    /// Get one order with its items.
    ///
    /// Returns `None` if the order doesn't exist in the store or holds no items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a row fails to decode.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, store_id: StoreId, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT orders.id AS order_id, orders.total, orders.created, orders.store_id,
                   items.id AS item_id, items.product_id,
                   products.name AS product_name, products.price AS product_price
            FROM orders
            JOIN items ON items.order_id = orders.id
            JOIN products ON products.id = items.product_id
            WHERE orders.id = $1 AND orders.store_id = $2
            ORDER BY items.id
            ",
        )
        .bind(id)
        .bind(store_id)
        .fetch(self.pool);

        collect_order(rows).await
    }

    /// Create an empty order (total 0) and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, store_id: StoreId) -> Result<OrderId, RepositoryError> {
        let id = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO orders (total, store_id)
            VALUES (0, $1)
            RETURNING id
            ",
        )
        .bind(store_id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        tracing::info!(store_id = %store_id, order_id = %id, "order created");
        Ok(id)
    }

    /// Delete an order.
    ///
    /// Items still pointing at the order keep their `order_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist in the store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, store_id: StoreId, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND store_id = $2")
            .bind(id)
            .bind(store_id)
            .execute(self.pool)
            .await?;

        expect_row(result.rows_affected())
    }
}

/// Fold a row stream into an [`OrderMap`].
///
/// The first row that fails to decode fails the whole listing; nothing folded
/// so far is returned.
async fn collect_orders<S>(rows: S) -> Result<OrderMap, RepositoryError>
where
    S: Stream<Item = Result<OrderRow, sqlx::Error>>,
{
    rows.try_fold(OrderMap::new(), |mut orders, row| async move {
        orders.push(row);
        Ok(orders)
    })
    .await
    .map_err(RepositoryError::from_read)
}

/// Fold the rows of a single-order query. `None` when no rows arrive.
async fn collect_order<S>(rows: S) -> Result<Option<Order>, RepositoryError>
where
    S: Stream<Item = Result<OrderRow, sqlx::Error>>,
{
    rows.try_fold(SingleOrder::new(), |mut order, row| async move {
        order.push(row);
        Ok(order)
    })
    .await
    .map(SingleOrder::finish)
    .map_err(RepositoryError::from_read)
}
