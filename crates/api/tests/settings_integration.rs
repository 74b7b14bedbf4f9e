//! Integration tests for the settings endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{create_products_per_page, json_request_as, TestApp};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_get_setting() {
    let app = TestApp::new();
    let created = create_products_per_page(&app, 24).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["key"], "products_per_page");

    let (status, body) = app.get("/api/v1/settings/products_per_page").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], 24);
    assert_eq!(body["data"]["category"], "catalog");
}

#[tokio::test]
async fn test_update_above_maximum_is_rejected_and_value_kept() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;

    let (status, body) = app
        .put("/api/v1/settings/products_per_page", json!({ "value": 500 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("above maximum 100"));

    let (_, body) = app
        .get("/api/v1/settings/products_per_page?use_cache=false")
        .await;
    assert_eq!(body["data"]["value"], 24);
}

#[tokio::test]
async fn test_update_is_visible_to_cached_and_uncached_reads() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;

    let (status, body) = app
        .put("/api/v1/settings/products_per_page", json!({ "value": 48 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["changed"], true);

    for uri in [
        "/api/v1/settings/products_per_page?use_cache=true",
        "/api/v1/settings/products_per_page?use_cache=false",
    ] {
        let (_, body) = app.get(uri).await;
        assert_eq!(body["data"]["value"], 48, "{}", uri);
    }
}

#[tokio::test]
async fn test_unchanged_value_reports_no_change() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;

    let (status, body) = app
        .put("/api/v1/settings/products_per_page", json!({ "value": 24 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["changed"], false);

    let (_, history) = app.get("/api/v1/settings/changes").await;
    // Only the creation event.
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_setting_returns_404() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/settings/missing_key").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = app
        .put("/api/v1/settings/missing_key", json!({ "value": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/v1/settings/missing_key").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_key_conflicts() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;
    let (status, body) = app
        .post(
            "/api/v1/settings",
            json!({ "key": "products_per_page", "value": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_invalid_key_rejected() {
    let app = TestApp::new();
    let (status, _) = app
        .post("/api/v1/settings", json!({ "key": "Bad Key", "value": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/api/v1/settings", json!({ "key": "", "value": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "key");
}

#[tokio::test]
async fn test_sensitive_values_are_redacted() {
    let app = TestApp::new();
    let (status, _) = app
        .post(
            "/api/v1/settings",
            json!({
                "key": "payments.api_secret",
                "value": "sk_live_123",
                "category": "payments",
                "isSensitive": true
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.get("/api/v1/settings?category=payments").await;
    let settings = body["data"].as_array().unwrap();
    assert_eq!(settings.len(), 1);
    assert_eq!(settings[0]["value"], "********");

    let (_, body) = app.get("/api/v1/settings/payments.api_secret").await;
    assert_eq!(body["data"]["value"], "********");
}

#[tokio::test]
async fn test_list_rejects_unknown_category() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/v1/settings?category=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bulk_update_applies_keys_independently() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;
    app.post(
        "/api/v1/settings",
        json!({ "key": "currency", "value": "USD" }),
    )
    .await;

    let (status, body) = app
        .put(
            "/api/v1/settings",
            json!({ "settings": {
                "products_per_page": 500,
                "currency": "EUR",
                "missing": true
            }}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], json!(["currency"]));
    assert_eq!(body["data"]["notFound"], json!(["missing"]));
    assert!(body["data"]["invalid"]["products_per_page"]
        .as_str()
        .unwrap()
        .contains("above maximum 100"));
}

#[tokio::test]
async fn test_validate_is_a_dry_run() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;

    let (status, body) = app
        .post(
            "/api/v1/settings/products_per_page/validate",
            json!({ "value": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isValid"], false);
    assert!(body["data"]["errorMessage"]
        .as_str()
        .unwrap()
        .contains("below minimum 1"));

    let (_, body) = app.get("/api/v1/settings/products_per_page").await;
    assert_eq!(body["data"]["value"], 24);
}

#[tokio::test]
async fn test_listener_receives_change_once() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    app.ctx.configuration.notifier().register_listener(
        "watch-ppp",
        move |event| {
            assert_eq!(event.old_value, Some(json!(24)));
            assert_eq!(event.new_value, Some(json!(30)));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        vec!["products_per_page".to_string()],
        0,
    );

    app.put("/api/v1/settings/products_per_page", json!({ "value": 30 }))
        .await;
    app.post("/api/v1/settings", json!({ "key": "currency", "value": "USD" }))
        .await;
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    let (_, body) = app.get("/api/v1/settings/listeners").await;
    let listeners = body["data"].as_array().unwrap();
    assert_eq!(listeners.len(), 1);
    assert_eq!(listeners[0]["listenerId"], "watch-ppp");
    assert_eq!(listeners[0]["isActive"], true);
}

#[tokio::test]
async fn test_enable_listener() {
    let app = TestApp::new();
    app.ctx
        .configuration
        .notifier()
        .register_listener("flaky", |_| Err("down".to_string()), vec![], 0);

    let (status, body) = app
        .post("/api/v1/settings/listeners/flaky/enable", json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], true);

    let (status, _) = app
        .post("/api/v1/settings/listeners/nope/enable", json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_durable_history_records_acting_user() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;
    let user_id = Uuid::new_v4();

    let (status, _) = app
        .send(json_request_as(
            Method::PUT,
            "/api/v1/settings/products_per_page",
            json!({ "value": 12 }),
            user_id,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .get("/api/v1/settings/products_per_page/history?limit=10")
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(body["data"]["total_count"], 2);
    assert_eq!(items[0]["changeType"], "VALUE_CHANGED");
    assert_eq!(items[0]["changedBy"], user_id.to_string());
}

#[tokio::test]
async fn test_invalid_acting_user_header() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;
    let mut request = common::json_request(
        Method::PUT,
        "/api/v1/settings/products_per_page",
        json!({ "value": 12 }),
    );
    request
        .headers_mut()
        .insert(common::ADMIN_USER_HEADER, "not-a-uuid".parse().unwrap());

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_setting() {
    let app = TestApp::new();
    create_products_per_page(&app, 24).await;

    let (status, body) = app.delete("/api/v1/settings/products_per_page").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (status, _) = app.get("/api/v1/settings/products_per_page").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
