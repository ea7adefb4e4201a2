//! Moving an item into and out of an order.
//!
//! An item is either [`ItemState::Unassigned`] or [`ItemState::Assigned`] to
//! exactly one order. A [`Transition`] moves it between the two and adjusts the
//! order's running total by the price of the item's product:
//!
//! ```text
//!               Assign(order)  (total += price)
//! Unassigned ────────────────────────────────────> Assigned(order)
//!            <────────────────────────────────────
//!               Unassign(order) (total -= price)
//! ```
//!
//! The current state is never read up front. Instead the item update only
//! matches rows in the required starting state, so the database decides
//! whether the transition is allowed, one row at a time. Two steps follow:
//!
//! 1. Update the item. Zero rows means the item was not in the required state
//!    (or does not exist under this store/product): [`AssignmentError::Unavailable`].
//! 2. Adjust the order total. Zero rows means the order does not exist:
//!    [`AssignmentError::OrderNotFound`].
//!
//! Step 1 is not undone when step 2 fails. Whether the two steps share a
//! transaction is up to the [`OrderLedger`] the caller provides.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{ItemId, OrderId, ProductId, StoreId};

/// Order membership of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    Unassigned,
    Assigned(OrderId),
}

impl ItemState {
    /// The `order_id` column value for this state.
    #[must_use]
    pub const fn order_id(self) -> Option<OrderId> {
        match self {
            Self::Unassigned => None,
            Self::Assigned(id) => Some(id),
        }
    }
}

impl From<Option<OrderId>> for ItemState {
    fn from(order_id: Option<OrderId>) -> Self {
        order_id.map_or(Self::Unassigned, Self::Assigned)
    }
}

/// Direction of a membership change, chosen by the caller (HTTP verb), not by
/// inspecting the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Add the item to the order.
    Assign,
    /// Take the item back out of the order.
    Unassign,
}

impl Transition {
    /// State the item must be in for the transition to apply.
    #[must_use]
    pub const fn requires(self, order_id: OrderId) -> ItemState {
        match self {
            Self::Assign => ItemState::Unassigned,
            Self::Unassign => ItemState::Assigned(order_id),
        }
    }

    /// State the item is left in.
    #[must_use]
    pub const fn produces(self, order_id: OrderId) -> ItemState {
        match self {
            Self::Assign => ItemState::Assigned(order_id),
            Self::Unassign => ItemState::Unassigned,
        }
    }

    /// How the order total moves.
    #[must_use]
    pub const fn adjustment(self) -> TotalAdjustment {
        match self {
            Self::Assign => TotalAdjustment::Add,
            Self::Unassign => TotalAdjustment::Subtract,
        }
    }
}

/// Sign of the change applied to an order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TotalAdjustment {
    Add,
    Subtract,
}

impl TotalAdjustment {
    /// Apply the adjustment to a total.
    #[must_use]
    pub fn apply(self, total: Decimal, price: Decimal) -> Decimal {
        match self {
            Self::Add => total + price,
            Self::Subtract => total - price,
        }
    }
}

/// Identifies an item together with the ancestors it must belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub item_id: ItemId,
    pub store_id: StoreId,
    pub product_id: ProductId,
}

/// A requested membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub item: ItemKey,
    pub order_id: OrderId,
    pub transition: Transition,
}

/// The two storage mutations a transition needs.
///
/// Both return the number of rows affected. Implementations must perform each
/// update as a single conditional statement so that the row-match check and
/// the write are atomic for that row.
pub trait OrderLedger {
    /// Storage error type.
    type Error;

    /// Set the item's order to `to` if the item matches `key` and is
    /// currently in state `from`.
    fn update_item_assignment(
        &mut self,
        key: ItemKey,
        from: ItemState,
        to: ItemState,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;

    /// Adjust the order's total by the current price of `product_id`.
    fn update_order_total(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
        adjustment: TotalAdjustment,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;
}

/// Why a transition was not (fully) applied.
#[derive(Debug, Error)]
pub enum AssignmentError<E> {
    /// The item update matched no row: already assigned, not assigned to this
    /// order, or not an item of this store/product.
    #[error("item is unavailable")]
    Unavailable,

    /// The item was updated but the order total update matched no row. The
    /// item update has already been applied.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// Storage failure.
    #[error("storage error: {0}")]
    Store(#[source] E),
}

/// Run a transition against a ledger.
///
/// # Errors
///
/// - `AssignmentError::Unavailable` if the item was not in the required state.
/// - `AssignmentError::OrderNotFound` if the order total could not be updated.
/// - `AssignmentError::Store` if either statement failed.
pub async fn apply<L: OrderLedger>(
    ledger: &mut L,
    request: AssignmentRequest,
) -> Result<(), AssignmentError<L::Error>> {
    let AssignmentRequest {
        item,
        order_id,
        transition,
    } = request;

    let moved = ledger
        .update_item_assignment(item, transition.requires(order_id), transition.produces(order_id))
        .await
        .map_err(AssignmentError::Store)?;
    if moved == 0 {
        return Err(AssignmentError::Unavailable);
    }

    let adjusted = ledger
        .update_order_total(order_id, item.product_id, transition.adjustment())
        .await
        .map_err(AssignmentError::Store)?;
    if adjusted == 0 {
        return Err(AssignmentError::OrderNotFound(order_id));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;
    use std::convert::Infallible;

    use super::*;

    #[derive(Debug)]
    struct StoredItem {
        store_id: StoreId,
        product_id: ProductId,
        order_id: Option<OrderId>,
    }

    /// Ledger over plain maps, applying the same row-match rules as the SQL.
    #[derive(Debug, Default)]
    struct MemoryLedger {
        items: HashMap<ItemId, StoredItem>,
        prices: HashMap<ProductId, Decimal>,
        totals: HashMap<OrderId, Decimal>,
        statements: usize,
    }

    impl OrderLedger for MemoryLedger {
        type Error = Infallible;

        async fn update_item_assignment(
            &mut self,
            key: ItemKey,
            from: ItemState,
            to: ItemState,
        ) -> Result<u64, Infallible> {
            self.statements += 1;
            let Some(item) = self.items.get_mut(&key.item_id) else {
                return Ok(0);
            };
            if item.store_id != key.store_id
                || item.product_id != key.product_id
                || ItemState::from(item.order_id) != from
            {
                return Ok(0);
            }
            item.order_id = to.order_id();
            Ok(1)
        }

        async fn update_order_total(
            &mut self,
            order_id: OrderId,
            product_id: ProductId,
            adjustment: TotalAdjustment,
        ) -> Result<u64, Infallible> {
            self.statements += 1;
            let (Some(total), Some(price)) =
                (self.totals.get_mut(&order_id), self.prices.get(&product_id))
            else {
                return Ok(0);
            };
            *total = adjustment.apply(*total, *price);
            Ok(1)
        }
    }

    const S1: StoreId = StoreId::new(1);
    const P1: ProductId = ProductId::new(1);
    const I1: ItemId = ItemId::new(1);
    const O1: OrderId = OrderId::new(1);

    fn ledger() -> MemoryLedger {
        let mut ledger = MemoryLedger::default();
        ledger.prices.insert(P1, Decimal::new(999, 2));
        ledger.items.insert(
            I1,
            StoredItem {
                store_id: S1,
                product_id: P1,
                order_id: None,
            },
        );
        ledger.totals.insert(O1, Decimal::ZERO);
        ledger
    }

    fn request(transition: Transition, order_id: OrderId) -> AssignmentRequest {
        AssignmentRequest {
            item: ItemKey {
                item_id: I1,
                store_id: S1,
                product_id: P1,
            },
            order_id,
            transition,
        }
    }

    #[tokio::test]
    async fn test_assign_then_reassign_then_unassign() {
        let mut ledger = ledger();

        apply(&mut ledger, request(Transition::Assign, O1))
            .await
            .unwrap();
        assert_eq!(ledger.totals[&O1], Decimal::new(999, 2));
        assert_eq!(ledger.items[&I1].order_id, Some(O1));

        let err = apply(&mut ledger, request(Transition::Assign, O1))
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentError::Unavailable));
        assert_eq!(ledger.totals[&O1], Decimal::new(999, 2));

        apply(&mut ledger, request(Transition::Unassign, O1))
            .await
            .unwrap();
        assert_eq!(ledger.totals[&O1], Decimal::new(0, 2));
        assert_eq!(ledger.items[&I1].order_id, None);
    }

    #[tokio::test]
    async fn test_unassign_requires_prior_assignment() {
        let mut ledger = ledger();

        let err = apply(&mut ledger, request(Transition::Unassign, O1))
            .await
            .unwrap_err();

        assert!(matches!(err, AssignmentError::Unavailable));
        assert_eq!(ledger.totals[&O1], Decimal::ZERO);
        // The total is never touched once the item update is rejected.
        assert_eq!(ledger.statements, 1);
    }

    #[tokio::test]
    async fn test_unassign_from_a_different_order_is_rejected() {
        let mut ledger = ledger();
        let other = OrderId::new(2);
        ledger.totals.insert(other, Decimal::ZERO);

        apply(&mut ledger, request(Transition::Assign, O1))
            .await
            .unwrap();
        let err = apply(&mut ledger, request(Transition::Unassign, other))
            .await
            .unwrap_err();

        assert!(matches!(err, AssignmentError::Unavailable));
        assert_eq!(ledger.items[&I1].order_id, Some(O1));
        assert_eq!(ledger.totals[&other], Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_unknown_order_leaves_item_assigned() {
        let mut ledger = ledger();
        let missing = OrderId::new(404);

        let err = apply(&mut ledger, request(Transition::Assign, missing))
            .await
            .unwrap_err();

        assert!(matches!(err, AssignmentError::OrderNotFound(id) if id == missing));
        assert_eq!(err.to_string(), "order 404 not found");
        assert_eq!(ledger.items[&I1].order_id, Some(missing));
        assert_eq!(ledger.statements, 2);
    }

    #[tokio::test]
    async fn test_item_under_wrong_product_is_unavailable() {
        let mut ledger = ledger();
        let mut req = request(Transition::Assign, O1);
        req.item.product_id = ProductId::new(2);

        let err = apply(&mut ledger, req).await.unwrap_err();

        assert!(matches!(err, AssignmentError::Unavailable));
        assert_eq!(ledger.items[&I1].order_id, None);
    }

    #[tokio::test]
    async fn test_totals_track_membership_across_items() {
        let mut ledger = ledger();
        let p2 = ProductId::new(2);
        let i2 = ItemId::new(2);
        ledger.prices.insert(p2, Decimal::new(2550, 2));
        ledger.items.insert(
            i2,
            StoredItem {
                store_id: S1,
                product_id: p2,
                order_id: None,
            },
        );

        apply(&mut ledger, request(Transition::Assign, O1))
            .await
            .unwrap();
        let mut second = request(Transition::Assign, O1);
        second.item.item_id = i2;
        second.item.product_id = p2;
        apply(&mut ledger, second).await.unwrap();
        assert_eq!(ledger.totals[&O1], Decimal::new(3549, 2));

        second.transition = Transition::Unassign;
        apply(&mut ledger, second).await.unwrap();
        assert_eq!(ledger.totals[&O1], Decimal::new(999, 2));
    }

    #[test]
    fn test_transition_states() {
        assert_eq!(Transition::Assign.requires(O1), ItemState::Unassigned);
        assert_eq!(Transition::Assign.produces(O1), ItemState::Assigned(O1));
        assert_eq!(Transition::Unassign.requires(O1), ItemState::Assigned(O1));
        assert_eq!(Transition::Unassign.produces(O1).order_id(), None);
        assert_eq!(
            TotalAdjustment::Subtract.apply(Decimal::TEN, Decimal::ONE),
            Decimal::new(9, 0)
        );
    }
}
