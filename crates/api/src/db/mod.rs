//! Database operations for the Stockroom `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `stores` - Merchants (root of the resource tree)
//! - `products` - Catalog entries, one store each
//! - `items` - Sellable units of a product; `order_id` is set while ordered
//! - `orders` - Orders with an incrementally maintained `total`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p stockroom-cli -- migrate
//! ```

pub mod items;
pub mod ledger;
pub mod orders;
pub mod products;
pub mod stores;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use items::ItemRepository;
pub use ledger::{AssignmentMode, PgOrderLedger};
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use stores::StoreRepository;

/// Maximum number of rows returned by any listing query.
pub const LIST_LIMIT: i64 = 100;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row could not be decoded into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., deleting a store that still has products).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify a read error, separating row decode failures from I/O failures.
    pub(crate) fn from_read(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_) => Self::DataCorruption(format!("decode error: {err}")),
            other => Self::Database(other),
        }
    }

    /// Classify an insert error: a foreign key violation means the parent is missing.
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_foreign_key_violation()
        {
            return Self::NotFound;
        }
        Self::Database(err)
    }

    /// Classify a delete error: a foreign key violation means children still exist.
    pub(crate) fn from_delete(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_foreign_key_violation()
        {
            return Self::Conflict(format!("{what} is still referenced"));
        }
        Self::Database(err)
    }
}

/// Turn a rows-affected count into `NotFound` when nothing matched.
pub(crate) const fn expect_row(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
