//! Common test utilities for integration tests.
//!
//! Most tests drive the router over in-memory stores. Tests that need
//! PostgreSQL read `TEST_DATABASE_URL` and skip when it is unset.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use domain::models::AuditEntry;
use domain::store::memory::MemoryAuditSink;
use domain::{AdminContext, Stores};
use marketplace_admin_api::{app::create_app, config::Config};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_USER_HEADER: &str = "x-admin-user-id";

/// Configuration for in-memory tests.
pub fn test_config() -> Config {
    Config {
        server: marketplace_admin_api::config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            max_body_size: 8 * 1024 * 1024,
            cors_origins: vec![],
        },
        database: marketplace_admin_api::config::DatabaseConfig {
            url: "memory://".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: marketplace_admin_api::config::LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        cache: Default::default(),
        notifier: Default::default(),
        content: Default::default(),
        media: Default::default(),
    }
}

/// A router plus the context behind it, so tests can inspect state directly.
pub struct TestApp {
    pub router: Router,
    pub ctx: Arc<AdminContext>,
    /// The audit sink, when the app runs on in-memory stores.
    pub audit: Option<Arc<MemoryAuditSink>>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let audit = Arc::new(MemoryAuditSink::new());
        let stores = Stores {
            audit: audit.clone(),
            ..Stores::in_memory()
        };
        let mut app = Self::with_stores(config, stores, None);
        app.audit = Some(audit);
        app
    }

    /// Build the app over an explicit store bundle, e.g. the PostgreSQL one.
    pub fn with_stores(config: Config, stores: Stores, pool: Option<PgPool>) -> Self {
        let ctx = Arc::new(AdminContext::new(
            stores,
            domain::services::SettingsValidator::new(),
            config.admin_options(),
        ));
        let router = create_app(config, ctx.clone(), pool);
        Self {
            router,
            ctx,
            audit: None,
        }
    }

    /// Audit entries recorded so far, oldest first.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit
            .as_ref()
            .map(|sink| sink.entries())
            .unwrap_or_default()
    }

    /// Send a request and return the status and parsed JSON body.
    pub async fn send(&self, request: Request<Body>) -> (axum::http::StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_response_body(response).await)
    }

    pub async fn get(&self, uri: &str) -> (axum::http::StatusCode, Value) {
        self.send(get_request(uri)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (axum::http::StatusCode, Value) {
        self.send(json_request(Method::POST, uri, body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (axum::http::StatusCode, Value) {
        self.send(json_request(Method::PUT, uri, body)).await
    }

    pub async fn delete(&self, uri: &str) -> (axum::http::StatusCode, Value) {
        self.send(delete_request(uri)).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a JSON request.
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a JSON request attributed to `user_id`.
pub fn json_request_as(method: Method, uri: &str, body: Value, user_id: Uuid) -> Request<Body> {
    let mut request = json_request(method, uri, body);
    request
        .headers_mut()
        .insert(ADMIN_USER_HEADER, user_id.to_string().parse().unwrap());
    request
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Pool for the PostgreSQL tests, or `None` when `TEST_DATABASE_URL` is unset.
pub async fn try_test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

/// Truncate every admin table.
pub async fn cleanup_all_test_data(pool: &PgPool) {
    let tables = [
        "audit_logs",
        "media_assets",
        "published_content",
        "content_versions",
        "config_cache_entries",
        "setting_changes",
        "settings",
    ];
    for table in tables {
        sqlx::query(&format!("TRUNCATE TABLE {} CASCADE", table))
            .execute(pool)
            .await
            .ok();
    }
}

/// Create the `products_per_page` setting used across tests: a number in 1..=100.
pub async fn create_products_per_page(app: &TestApp, value: i64) -> Value {
    let (status, body) = app
        .post(
            "/api/v1/settings",
            serde_json::json!({
                "key": "products_per_page",
                "value": value,
                "category": "catalog",
                "validationRules": { "type": "number", "min": 1, "max": 100 }
            }),
        )
        .await;
    assert_eq!(status, axum::http::StatusCode::CREATED, "body: {}", body);
    body
}

/// Create a content element and return the version 1 id.
pub async fn create_element(app: &TestApp, element_id: &str, content: &str) -> String {
    let (status, body) = app
        .post(
            "/api/v1/content",
            serde_json::json!({ "elementId": element_id, "content": content }),
        )
        .await;
    assert_eq!(status, axum::http::StatusCode::CREATED, "body: {}", body);
    body["data"]["id"].as_str().unwrap().to_string()
}
