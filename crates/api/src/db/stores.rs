//! Store repository.

use sqlx::PgPool;

use stockroom_core::{Store, StoreId};

use super::{LIST_LIMIT, RepositoryError, expect_row};

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List stores, at most [`LIST_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Store>, RepositoryError> {
        sqlx::query_as::<_, Store>(
            r"
            SELECT id, name, description
            FROM stores
            ORDER BY id
            LIMIT $1
            ",
        )
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_read)
    }

    /// Get a store by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        sqlx::query_as::<_, Store>(
            r"
            SELECT id, name, description
            FROM stores
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)
    }

    /// Create a store and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, name: &str, description: &str) -> Result<StoreId, RepositoryError> {
        let id = sqlx::query_scalar::<_, StoreId>(
            r"
            INSERT INTO stores (name, description)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(store_id = %id, "store created");
        Ok(id)
    }

    /// Replace a store's name and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: StoreId,
        name: &str,
        description: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE stores
            SET name = $2, description = $3
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(self.pool)
        .await?;

        expect_row(result.rows_affected())
    }

    /// Delete a store. Products, items and orders are not cascaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    /// Returns `RepositoryError::Conflict` if products or orders still reference it.
    pub async fn delete(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_delete(e, "store"))?;

        expect_row(result.rows_affected())?;
        tracing::info!(store_id = %id, "store deleted");
        Ok(())
    }
}
