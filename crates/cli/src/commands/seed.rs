//! Insert demo data: one store, two products with items, and an order
//! holding one item of each product.

use rust_decimal::Decimal;
use tracing::info;

use stockroom_api::db::{
    AssignmentMode, ItemRepository, OrderRepository, ProductRepository, StoreRepository, ledger,
};
use stockroom_core::assignment::{AssignmentRequest, ItemKey, Transition};
use stockroom_core::{ItemId, OrderId, ProductId, StoreId};

use super::{CommandError, connect};

const DEMO_PRODUCTS: [(&str, i64); 2] = [("Espresso Beans 1kg", 1999), ("Ceramic Mug", 899)];

/// Seed the demo store.
///
/// # Errors
///
/// Returns an error if the database is unreachable or any insert fails.
pub async fn run(items_per_product: u32) -> Result<(), CommandError> {
    let pool = connect().await?;

    let store_id = StoreRepository::new(&pool)
        .create("Demo Roastery", "Seeded by stockroom-cli")
        .await?;
    info!(%store_id, "Created store");

    let products = ProductRepository::new(&pool);
    let items = ItemRepository::new(&pool);
    let mut first_items: Vec<(ProductId, ItemId)> = Vec::new();

    for (name, cents) in DEMO_PRODUCTS {
        let product_id = products
            .create(store_id, name, Decimal::new(cents, 2))
            .await?;

        let mut first = None;
        for _ in 0..items_per_product {
            let item_id = items.create(store_id, product_id).await?;
            if first.is_none() {
                first = Some(item_id);
            }
        }
        info!(%product_id, product = name, items = items_per_product, "Created product");

        if let Some(item_id) = first {
            first_items.push((product_id, item_id));
        }
    }

    let order_id = OrderRepository::new(&pool).create(store_id).await?;
    for (product_id, item_id) in first_items {
        assign(&pool, store_id, product_id, item_id, order_id).await?;
    }
    info!(%order_id, "Created order");

    info!("Seed complete!");
    Ok(())
}

async fn assign(
    pool: &sqlx::PgPool,
    store_id: StoreId,
    product_id: ProductId,
    item_id: ItemId,
    order_id: OrderId,
) -> Result<(), CommandError> {
    let request = AssignmentRequest {
        item: ItemKey {
            item_id,
            store_id,
            product_id,
        },
        order_id,
        transition: Transition::Assign,
    };
    ledger::run(pool, AssignmentMode::Transactional, request).await?;
    Ok(())
}
