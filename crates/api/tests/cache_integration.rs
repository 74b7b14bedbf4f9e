//! Integration tests for the configuration cache endpoints.

mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{create_products_per_page, json_request_as, TestApp};
use serde_json::json;
use uuid::Uuid;

async fn seed(app: &TestApp, keys: &[&str]) {
    for key in keys {
        app.ctx.cache.set(key, json!(key), None).await;
    }
}

#[tokio::test]
async fn test_stats_track_setting_reads() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;
    app.get("/api/v1/settings/products_per_page").await;
    app.get("/api/v1/settings/products_per_page").await;

    let (status, body) = app.get("/api/v1/cache/stats").await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert!(stats["hits"].as_u64().unwrap() >= 1);
    assert!(stats["memoryEntries"].as_u64().unwrap() >= 1);
    assert_eq!(stats["maxSize"], 1000);
}

#[tokio::test]
async fn test_invalidate_by_key() {
    let app = TestApp::new();
    seed(&app, &["setting:a", "setting:b"]).await;

    let (status, body) = app
        .post("/api/v1/cache/invalidate", json!({ "key": "setting:a" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);
    assert!(!app.ctx.cache.contains_in_memory("setting:a"));
    assert!(app.ctx.cache.contains_in_memory("setting:b"));

    let (_, body) = app
        .post("/api/v1/cache/invalidate", json!({ "key": "setting:a" }))
        .await;
    assert_eq!(body["data"]["removed"], 0);
}

#[tokio::test]
async fn test_invalidate_by_pattern() {
    let app = TestApp::new();
    seed(&app, &["setting:shop.name", "setting:shop.email", "content:hero"]).await;

    let (status, body) = app
        .post("/api/v1/cache/invalidate", json!({ "pattern": "^setting:shop\\." }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 2);
    assert!(app.ctx.cache.contains_in_memory("content:hero"));
}

#[tokio::test]
async fn test_invalidate_rejects_bad_requests() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/v1/cache/invalidate", json!({ "pattern": "([unclosed" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = app.post("/api/v1/cache/invalidate", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/cache/invalidate",
            json!({ "key": "a", "pattern": "a" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cleanup_removes_only_expired_entries() {
    let app = TestApp::new();
    app.ctx
        .cache
        .set("stale", json!(1), Some(Duration::zero()))
        .await;
    seed(&app, &["fresh"]).await;

    let (status, body) = app.post("/api/v1/cache/cleanup", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);
    assert!(app.ctx.cache.contains_in_memory("fresh"));
}

#[tokio::test]
async fn test_clear_empties_cache() {
    let app = TestApp::new();
    seed(&app, &["one", "two"]).await;

    let (status, body) = app.delete("/api/v1/cache").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cleared"], true);

    let (_, body) = app.get("/api/v1/cache/stats").await;
    assert_eq!(body["data"]["memoryEntries"], 0);
}

#[tokio::test]
async fn test_cache_mutations_are_audited() {
    let app = TestApp::new();
    seed(&app, &["setting:a"]).await;
    let user_id = Uuid::new_v4();

    let mut request = common::delete_request("/api/v1/cache");
    request
        .headers_mut()
        .insert(common::ADMIN_USER_HEADER, user_id.to_string().parse().unwrap());
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(json_request_as(
            Method::POST,
            "/api/v1/cache/invalidate",
            json!({ "pattern": "([unclosed" }),
            user_id,
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let entries = app.audit_entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "cache.clear");
    assert_eq!(entries[0].resource_type, "cache");
    assert_eq!(entries[0].user_id, Some(user_id));
    assert!(entries[0].success);
    assert_eq!(entries[1].action, "cache.invalidate");
    assert!(!entries[1].success);
}
