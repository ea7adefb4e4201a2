//! Product repository. Every query is scoped by store.

use rust_decimal::Decimal;
use sqlx::PgPool;

use stockroom_core::{Product, ProductId, StoreId};

use super::{LIST_LIMIT, RepositoryError, expect_row};

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a store's products, at most [`LIST_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, store_id: StoreId) -> Result<Vec<Product>, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            SELECT id, store_id, name, price
            FROM products
            WHERE store_id = $1
            ORDER BY id
            LIMIT $2
            ",
        )
        .bind(store_id)
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_read)
    }

    /// Get a product by id within a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store_id: StoreId,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            SELECT id, store_id, name, price
            FROM products
            WHERE id = $1 AND store_id = $2
            ",
        )
        .bind(id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)
    }

    /// Create a product under a store and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        store_id: StoreId,
        name: &str,
        price: Decimal,
    ) -> Result<ProductId, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO products (name, price, store_id)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(price)
        .bind(store_id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        tracing::info!(store_id = %store_id, product_id = %id, %price, "product created");
        Ok(id)
    }

    /// Replace a product's name and price.
    ///
    /// Orders already holding items of this product keep their totals; the
    /// new price applies to later assignments.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist in the store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        store_id: StoreId,
        id: ProductId,
        name: &str,
        price: Decimal,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $3, price = $4
            WHERE id = $1 AND store_id = $2
            ",
        )
        .bind(id)
        .bind(store_id)
        .bind(name)
        .bind(price)
        .execute(self.pool)
        .await?;

        expect_row(result.rows_affected())
    }

    /// Delete a product from a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist in the store.
    /// Returns `RepositoryError::Conflict` if items still reference it.
    pub async fn delete(&self, store_id: StoreId, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND store_id = $2")
            .bind(id)
            .bind(store_id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_delete(e, "product"))?;

        expect_row(result.rows_affected())
    }
}
