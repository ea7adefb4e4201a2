//! `PostgreSQL` implementation of the item/order ledger.
//!
//! Each ledger method is one conditional `UPDATE`, so `PostgreSQL` row locking
//! serializes concurrent assignments of the same item: only one of two racing
//! `Assign` calls can match `order_id IS NOT DISTINCT FROM NULL`.

use std::fmt;
use std::str::FromStr;

use sqlx::{PgConnection, PgPool};

use stockroom_core::assignment::{
    self, AssignmentError, AssignmentRequest, ItemKey, ItemState, OrderLedger, TotalAdjustment,
};
use stockroom_core::{OrderId, ProductId};

/// How the item update and the order total update are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentMode {
    /// Each statement commits on its own. If the order update matches nothing,
    /// the item stays assigned to the unknown order.
    #[default]
    Sequential,
    /// Both statements share a transaction that is rolled back on any failure.
    Transactional,
}

impl FromStr for AssignmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "transactional" => Ok(Self::Transactional),
            other => Err(format!(
                "unknown assignment mode '{other}' (expected sequential or transactional)"
            )),
        }
    }
}

impl fmt::Display for AssignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::Transactional => f.write_str("transactional"),
        }
    }
}

const UPDATE_ITEM_ORDER: &str = r"
    UPDATE items
    SET order_id = $4
    WHERE id = $1 AND store_id = $2 AND product_id = $3
      AND order_id IS NOT DISTINCT FROM $5
";

const ADD_PRODUCT_PRICE: &str = r"
    UPDATE orders
    SET total = orders.total + products.price
    FROM products
    WHERE orders.id = $1 AND products.id = $2
";

const SUBTRACT_PRODUCT_PRICE: &str = r"
    UPDATE orders
    SET total = orders.total - products.price
    FROM products
    WHERE orders.id = $1 AND products.id = $2
";

/// Ledger bound to one connection (pooled or inside a transaction).
pub struct PgOrderLedger<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgOrderLedger<'c> {
    /// Wrap a connection.
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

impl OrderLedger for PgOrderLedger<'_> {
    type Error = sqlx::Error;

    async fn update_item_assignment(
        &mut self,
        key: ItemKey,
        from: ItemState,
        to: ItemState,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(UPDATE_ITEM_ORDER)
            .bind(key.item_id)
            .bind(key.store_id)
            .bind(key.product_id)
            .bind(to.order_id())
            .bind(from.order_id())
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn update_order_total(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
        adjustment: TotalAdjustment,
    ) -> Result<u64, sqlx::Error> {
        let sql = match adjustment {
            TotalAdjustment::Add => ADD_PRODUCT_PRICE,
            TotalAdjustment::Subtract => SUBTRACT_PRODUCT_PRICE,
        };

        let result = sqlx::query(sql)
            .bind(order_id)
            .bind(product_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Run an assignment transition against the pool in the given mode.
///
/// # Errors
///
/// Returns the transition's `AssignmentError`; acquiring a connection,
/// committing, or rolling back failures surface as `AssignmentError::Store`.
pub async fn run(
    pool: &PgPool,
    mode: AssignmentMode,
    request: AssignmentRequest,
) -> Result<(), AssignmentError<sqlx::Error>> {
    let outcome = match mode {
        AssignmentMode::Sequential => {
            let mut conn = pool.acquire().await.map_err(AssignmentError::Store)?;
            assignment::apply(&mut PgOrderLedger::new(&mut conn), request).await
        }
        AssignmentMode::Transactional => {
            let mut tx = pool.begin().await.map_err(AssignmentError::Store)?;
            let outcome = assignment::apply(&mut PgOrderLedger::new(&mut tx), request).await;
            if outcome.is_ok() {
                tx.commit().await.map_err(AssignmentError::Store)?;
            } else {
                tx.rollback().await.map_err(AssignmentError::Store)?;
            }
            outcome
        }
    };

    match &outcome {
        Ok(()) => tracing::info!(
            item_id = %request.item.item_id,
            order_id = %request.order_id,
            transition = ?request.transition,
            %mode,
            "item order membership changed"
        ),
        Err(AssignmentError::OrderNotFound(order_id)) if mode == AssignmentMode::Sequential => {
            tracing::warn!(
                item_id = %request.item.item_id,
                order_id = %order_id,
                transition = ?request.transition,
                "item updated but order total was not; item now references a missing order"
            );
        }
        Err(err) => tracing::debug!(
            item_id = %request.item.item_id,
            order_id = %request.order_id,
            error = %err,
            "item order membership unchanged"
        ),
    }

    outcome
}
