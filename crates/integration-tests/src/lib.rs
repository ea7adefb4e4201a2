//! Integration test harness for Stockroom.
//!
//! Requests are driven through the real router in-process with
//! `tower::ServiceExt::oneshot`; no socket is bound.
//!
//! # Running Tests
//!
//! ```bash
//! # Validation and health tests (no database needed)
//! cargo test -p stockroom-integration-tests
//!
//! # Database-backed scenarios (each test gets a fresh, migrated database)
//! DATABASE_URL=postgres://localhost/stockroom cargo test -p stockroom-integration-tests -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;

use stockroom_api::config::ApiConfig;
use stockroom_api::db::AssignmentMode;
use stockroom_api::state::AppState;

/// URL of a database that is never contacted.
const UNREACHABLE_DATABASE_URL: &str = "postgres://stockroom@127.0.0.1:1/stockroom";

/// The application under test.
#[derive(Clone)]
pub struct TestApp {
    app: NormalizePath<Router>,
}

impl TestApp {
    /// Build the app over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool, assignment_mode: AssignmentMode) -> Self {
        let config = ApiConfig {
            database_url: SecretString::from(UNREACHABLE_DATABASE_URL),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            max_connections: 1,
            assignment_mode,
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
        };
        Self {
            app: stockroom_api::app(AppState::new(config, pool)),
        }
    }

    /// Build the app over a pool that never connects.
    ///
    /// Any handler that reaches storage fails after the acquire timeout, so a
    /// fast 422 proves validation ran first.
    #[must_use]
    pub fn without_database() -> Self {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(UNREACHABLE_DATABASE_URL)
            .unwrap();
        Self::new(pool, AssignmentMode::default())
    }

    /// Send a request and return the status and raw body.
    pub async fn send_raw(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    /// Send a request and parse the JSON response body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(Method::POST, uri, body).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// POST and return the id from a `{"status":"ok","data":"<id>"}` envelope.
    pub async fn create(&self, uri: &str, body: Option<Value>) -> String {
        let (status, envelope) = self.post(uri, body).await;
        assert_eq!(status, StatusCode::OK, "POST {uri} failed: {envelope}");
        assert_eq!(envelope["status"], "ok");
        envelope["data"].as_str().unwrap().to_string()
    }
}

/// Assert a failure envelope with the given status and message.
pub fn assert_fail(response: &(StatusCode, Value), status: StatusCode, message: &str) {
    assert_eq!(response.0, status, "unexpected body: {}", response.1);
    assert_eq!(response.1["status"], "fail");
    assert_eq!(response.1["data"], message);
}

/// Assert `{"status":"ok"}`.
pub fn assert_ok(response: &(StatusCode, Value)) {
    assert_eq!(response.0, StatusCode::OK, "unexpected body: {}", response.1);
    assert_eq!(response.1, serde_json::json!({"status": "ok"}));
}
