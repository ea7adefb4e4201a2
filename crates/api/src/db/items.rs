//! Item repository. Items are always addressed through their store and product.
//!
//! Order membership is not changed here; see [`super::ledger`].

use sqlx::PgPool;

use stockroom_core::{Item, ItemId, ProductId, StoreId};

use super::{LIST_LIMIT, RepositoryError, expect_row};

/// Repository for item database operations.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the items of a product, joined with the product's name and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        store_id: StoreId,
        product_id: ProductId,
    ) -> Result<Vec<Item>, RepositoryError> {
        sqlx::query_as::<_, Item>(
            r"
            SELECT items.id, items.product_id, items.store_id,
                   products.name, products.price, items.order_id
            FROM items
            JOIN products ON items.product_id = products.id
            WHERE items.store_id = $1 AND items.product_id = $2
            ORDER BY items.id
            LIMIT $3
            ",
        )
        .bind(store_id)
        .bind(product_id)
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_read)
    }

    /// Get one item of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        id: ItemId,
    ) -> Result<Option<Item>, RepositoryError> {
        sqlx::query_as::<_, Item>(
            r"
            SELECT items.id, items.product_id, items.store_id,
                   products.name, products.price, items.order_id
            FROM items
            JOIN products ON items.product_id = products.id
            WHERE items.id = $1 AND items.store_id = $2 AND items.product_id = $3
            ",
        )
        .bind(id)
        .bind(store_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)
    }

    /// Create an unassigned item and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store or product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        store_id: StoreId,
        product_id: ProductId,
    ) -> Result<ItemId, RepositoryError> {
        let id = sqlx::query_scalar::<_, ItemId>(
            r"
            INSERT INTO items (store_id, product_id)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(store_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        tracing::info!(store_id = %store_id, product_id = %product_id, item_id = %id, "item created");
        Ok(id)
    }

    /// Delete an item.
    ///
    /// Deleting an assigned item does not adjust its order's total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist under the product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        id: ItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM items
            WHERE id = $1 AND store_id = $2 AND product_id = $3
            ",
        )
        .bind(id)
        .bind(store_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        expect_row(result.rows_affected())
    }
}
