//! Database-backed scenarios: CRUD across the resource tree and the
//! assign/unassign flow with its order total.
//!
//! Each test gets a fresh database with migrations applied. They need a
//! reachable `DATABASE_URL` and are skipped by default.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

use stockroom_api::db::AssignmentMode;
use stockroom_integration_tests::{TestApp, assert_fail, assert_ok};

struct Fixture {
    app: TestApp,
    store: String,
    product: String,
    item: String,
    order: String,
}

impl Fixture {
    /// Store S1, product P1 at 9.99, item I1, empty order O1.
    async fn new(pool: PgPool, mode: AssignmentMode) -> Self {
        let app = TestApp::new(pool, mode);
        let store = app
            .create("/stores", Some(json!({"name": "S1", "description": "first"})))
            .await;
        let product = app
            .create(
                &format!("/stores/{store}/products"),
                Some(json!({"name": "P1", "price": 9.99})),
            )
            .await;
        let item = app
            .create(&format!("/stores/{store}/products/{product}/items"), None)
            .await;
        let order = app.create(&format!("/stores/{store}/orders"), None).await;
        Self {
            app,
            store,
            product,
            item,
            order,
        }
    }

    fn membership_uri(&self, order: &str) -> String {
        format!(
            "/stores/{}/products/{}/items/{}/order?id={order}",
            self.store, self.product, self.item
        )
    }

    async fn assign(&self, order: &str) -> (StatusCode, Value) {
        self.app.post(&self.membership_uri(order), None).await
    }

    async fn unassign(&self, order: &str) -> (StatusCode, Value) {
        self.app.delete(&self.membership_uri(order)).await
    }

    async fn item(&self) -> Value {
        let (status, item) = self
            .app
            .get(&format!(
                "/stores/{}/products/{}/items/{}",
                self.store, self.product, self.item
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        item
    }

    async fn order(&self) -> (StatusCode, Value) {
        self.app
            .get(&format!("/stores/{}/orders/{}", self.store, self.order))
            .await
    }

    async fn order_total(&self, pool: &PgPool) -> f64 {
        let total: String =
            sqlx::query_scalar("SELECT total::TEXT FROM orders WHERE id = $1::INTEGER")
                .bind(self.order.parse::<i32>().unwrap())
                .fetch_one(pool)
                .await
                .unwrap();
        total.parse().unwrap()
    }
}

fn id_of(value: &Value) -> String {
    value["id"].as_i64().unwrap().to_string()
}

// =============================================================================
// Resource CRUD
// =============================================================================

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_store_crud(pool: PgPool) {
    let app = TestApp::new(pool, AssignmentMode::Sequential);

    let id = app
        .create("/stores", Some(json!({"name": "Corner Shop", "description": "open late"})))
        .await;

    let (status, store) = app.get(&format!("/stores/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store["name"], "Corner Shop");
    assert_eq!(id_of(&store), id);

    assert_ok(
        &app.patch(
            &format!("/stores/{id}/"),
            json!({"name": "Corner Shop", "description": "open early"}),
        )
        .await,
    );
    let (_, stores) = app.get("/stores/").await;
    assert_eq!(stores.as_array().unwrap().len(), 1);
    assert_eq!(stores[0]["description"], "open early");

    assert_ok(&app.delete(&format!("/stores/{id}")).await);
    assert_fail(&app.get(&format!("/stores/{id}")).await, StatusCode::NOT_FOUND, "not found");
    assert_fail(&app.delete(&format!("/stores/{id}")).await, StatusCode::NOT_FOUND, "not found");
}

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_product_and_item_crud(pool: PgPool) {
    let app = TestApp::new(pool, AssignmentMode::Sequential);
    let store = app.create("/stores", Some(json!({"name": "S"}))).await;

    let product = app
        .create(
            &format!("/stores/{store}/products"),
            Some(json!({"name": "Mug", "price": 8.5})),
        )
        .await;
    assert_ok(
        &app.patch(
            &format!("/stores/{store}/products/{product}"),
            json!({"name": "Big Mug", "price": 10.25}),
        )
        .await,
    );
    let (status, fetched) = app.get(&format!("/stores/{store}/products/{product}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Big Mug");
    assert_eq!(fetched["price"].as_f64(), Some(10.25));

    let items_uri = format!("/stores/{store}/products/{product}/items");
    let first = app.create(&items_uri, None).await;
    let _second = app.create(&items_uri, None).await;

    let (_, items) = app.get(&items_uri).await;
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(id_of(&items[0]), first);
    assert_eq!(items[0]["name"], "Big Mug");
    assert!(items[0]["order_id"].is_null());

    assert_ok(&app.delete(&format!("{items_uri}/{first}")).await);
    let (_, items) = app.get(&items_uri).await;
    assert_eq!(items.as_array().unwrap().len(), 1);

    // A product that is not in this store is invisible through it.
    let other_store = app.create("/stores", Some(json!({"name": "Other"}))).await;
    assert_fail(
        &app.get(&format!("/stores/{other_store}/products/{product}")).await,
        StatusCode::NOT_FOUND,
        "not found",
    );
}

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_parents_with_children_cannot_be_deleted(pool: PgPool) {
    let fx = Fixture::new(pool, AssignmentMode::Sequential).await;

    assert_fail(
        &fx.app.delete(&format!("/stores/{}", fx.store)).await,
        StatusCode::CONFLICT,
        "store is still referenced",
    );
    assert_fail(
        &fx.app
            .delete(&format!("/stores/{}/products/{}", fx.store, fx.product))
            .await,
        StatusCode::CONFLICT,
        "product is still referenced",
    );
}

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_children_of_unknown_parents_are_not_found(pool: PgPool) {
    let app = TestApp::new(pool, AssignmentMode::Sequential);

    assert_fail(
        &app.post("/stores/404/products", Some(json!({"name": "Ghost", "price": 1}))).await,
        StatusCode::NOT_FOUND,
        "not found",
    );
    assert_fail(
        &app.post("/stores/404/orders", None).await,
        StatusCode::NOT_FOUND,
        "not found",
    );
}

// =============================================================================
// Assignment
// =============================================================================

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_assign_then_reassign_then_unassign(pool: PgPool) {
    let fx = Fixture::new(pool.clone(), AssignmentMode::Sequential).await;
    assert!((fx.order_total(&pool).await).abs() < f64::EPSILON);

    assert_ok(&fx.assign(&fx.order).await);
    assert!((fx.order_total(&pool).await - 9.99).abs() < 1e-9);
    assert_eq!(fx.item().await["order_id"].as_i64().unwrap().to_string(), fx.order);

    let (status, order) = fx.order().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["total"].as_f64(), Some(9.99));
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["items"][0]["name"], "P1");

    assert_fail(&fx.assign(&fx.order).await, StatusCode::CONFLICT, "item is unavailable");
    assert!((fx.order_total(&pool).await - 9.99).abs() < 1e-9);

    assert_ok(&fx.unassign(&fx.order).await);
    assert!((fx.order_total(&pool).await).abs() < f64::EPSILON);
    assert!(fx.item().await["order_id"].is_null());

    // The order has no items left, so the joined lookup no longer finds it.
    assert_fail(&fx.order().await, StatusCode::NOT_FOUND, "not found");
}

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_unassign_without_assignment_conflicts(pool: PgPool) {
    let fx = Fixture::new(pool.clone(), AssignmentMode::Sequential).await;

    assert_fail(&fx.unassign(&fx.order).await, StatusCode::CONFLICT, "item is unavailable");
    assert!((fx.order_total(&pool).await).abs() < f64::EPSILON);
}

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_unassign_from_other_order_conflicts(pool: PgPool) {
    let fx = Fixture::new(pool.clone(), AssignmentMode::Sequential).await;
    let other = fx.app.create(&format!("/stores/{}/orders", fx.store), None).await;

    assert_ok(&fx.assign(&fx.order).await);
    assert_fail(&fx.unassign(&other).await, StatusCode::CONFLICT, "item is unavailable");
    assert_eq!(fx.item().await["order_id"].as_i64().unwrap().to_string(), fx.order);
}

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_assign_to_unknown_order_sequential_leaves_item_assigned(pool: PgPool) {
    let fx = Fixture::new(pool, AssignmentMode::Sequential).await;

    assert_fail(&fx.assign("999999").await, StatusCode::NOT_FOUND, "not found");
    assert_eq!(fx.item().await["order_id"], json!(999_999));
}

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_assign_to_unknown_order_transactional_rolls_back(pool: PgPool) {
    let fx = Fixture::new(pool, AssignmentMode::Transactional).await;

    assert_fail(&fx.assign("999999").await, StatusCode::NOT_FOUND, "not found");
    assert!(fx.item().await["order_id"].is_null());

    assert_ok(&fx.assign(&fx.order).await);
}

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_assign_with_wrong_product_conflicts(pool: PgPool) {
    let fx = Fixture::new(pool, AssignmentMode::Sequential).await;
    let other_product = fx
        .app
        .create(
            &format!("/stores/{}/products", fx.store),
            Some(json!({"name": "P2", "price": 1.5})),
        )
        .await;

    let uri = format!(
        "/stores/{}/products/{other_product}/items/{}/order?id={}",
        fx.store, fx.item, fx.order
    );
    assert_fail(&fx.app.post(&uri, None).await, StatusCode::CONFLICT, "item is unavailable");
    assert!(fx.item().await["order_id"].is_null());
}

// =============================================================================
// Order listing
// =============================================================================

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_order_listing_groups_items_by_order(pool: PgPool) {
    let fx = Fixture::new(pool, AssignmentMode::Sequential).await;
    let items_uri = format!("/stores/{}/products/{}/items", fx.store, fx.product);
    let second_item = fx.app.create(&items_uri, None).await;
    let empty_order = fx.app.create(&format!("/stores/{}/orders", fx.store), None).await;

    assert_ok(&fx.assign(&fx.order).await);
    assert_ok(
        &fx.app
            .post(&format!("{items_uri}/{second_item}/order?id={}", fx.order), None)
            .await,
    );

    let (status, orders) = fx.app.get(&format!("/stores/{}/orders", fx.store)).await;
    assert_eq!(status, StatusCode::OK);

    let orders = orders.as_object().unwrap();
    assert_eq!(orders.len(), 1, "orders without items are not listed");
    assert!(!orders.contains_key(&empty_order));

    let order = &orders[&fx.order];
    assert_eq!(order["total"].as_f64(), Some(19.98));
    let item_ids: Vec<String> = order["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(id_of)
        .collect();
    assert_eq!(item_ids, vec![fx.item.clone(), second_item]);
}

#[sqlx::test(migrator = "stockroom_api::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn test_deleting_order_keeps_item_reference(pool: PgPool) {
    let fx = Fixture::new(pool, AssignmentMode::Sequential).await;
    assert_ok(&fx.assign(&fx.order).await);

    assert_ok(&fx.app.delete(&format!("/stores/{}/orders/{}", fx.store, fx.order)).await);
    assert_fail(&fx.order().await, StatusCode::NOT_FOUND, "not found");
    assert_eq!(fx.item().await["order_id"].as_i64().unwrap().to_string(), fx.order);
}
