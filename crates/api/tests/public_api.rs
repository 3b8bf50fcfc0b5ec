//! HTTP-level tests for the unauthenticated overlay cold load.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, get};
use overlay_core::schema::default_settings;
use overlay_core::widget::WidgetType;
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: unknown username is 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_username_is_404() {
    let (app, _store) = common::build_test_app();
    let response = get(app, "/api/v1/public/ghost/visualizer").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: known user without a row gets defaults
// ---------------------------------------------------------------------------

#[tokio::test]
async fn known_user_without_row_gets_defaults() {
    let (app, store) = common::build_test_app();
    store.insert_profile("user-1", "streamer").await;

    let response = get(app, "/api/v1/public/streamer/visualizer").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["data"]["settings"],
        default_settings(WidgetType::Visualizer)
    );
    assert!(json["data"]["version"].is_null());
}

// ---------------------------------------------------------------------------
// Test: stored legacy rows are reconciled before being served
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stored_row_is_reconciled() {
    let (app, store) = common::build_test_app();
    store.insert_profile("user-1", "streamer").await;
    store
        .seed_settings(
            "user-1",
            WidgetType::Visualizer,
            json!({
                "legacyColor": "#fff",
                "visual": {"text": {"size": 24, "weight": "heavy"}},
            }),
        )
        .await;

    let response = get(app, "/api/v1/public/streamer/visualizer").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let settings = &json["data"]["settings"];
    assert_eq!(settings["visual"]["text"]["size"], 24);
    assert_eq!(settings["visual"]["text"]["weight"], "normal");
    assert!(settings.get("legacyColor").is_none());
    assert_eq!(json["data"]["version"], 1);
}

// ---------------------------------------------------------------------------
// Test: a slow store falls back to defaults within the cold-load bound
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slow_store_serves_defaults() {
    let (app, store) = common::build_test_app();
    store.insert_profile("user-1", "streamer").await;
    store
        .seed_settings("user-1", WidgetType::Stats, json!({}))
        .await;
    store.set_read_delay(Some(Duration::from_millis(500)));

    let response = get(app, "/api/v1/public/streamer/stats").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["settings"], default_settings(WidgetType::Stats));
    assert!(json["data"]["version"].is_null());
}

// ---------------------------------------------------------------------------
// Test: an unreachable store during name lookup is 503
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_store_during_lookup_is_503() {
    let (app, store) = common::build_test_app();
    store.insert_profile("user-1", "streamer").await;
    store.set_reachable(false);

    let response = get(app, "/api/v1/public/streamer/chat").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
