//! HTTP-level tests for the authenticated settings editor endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, patch_json_auth};
use overlay_core::schema::default_settings;
use overlay_core::widget::WidgetType;
use overlay_db::{RowStore, StoreError};
use serde_json::json;

const USER: &str = "user-1";

// ---------------------------------------------------------------------------
// Test: settings routes require a token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn settings_without_token_is_401() {
    let (app, _store) = common::build_test_app();
    let response = get(app, "/api/v1/widgets/chat/settings").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_401() {
    let (app, _store) = common::build_test_app();
    let request = axum::http::Request::builder()
        .uri("/api/v1/widgets/chat/settings")
        .header("authorization", "Bearer not-a-jwt")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn percent_encoded_query_token_is_accepted() {
    let (app, _store) = common::build_test_app();
    let token = common::access_token(USER).replace('.', "%2E");
    let uri = format!("/api/v1/widgets/chat/settings?view=a%26b&access_token={token}");
    let response = get(app, &uri).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_query_token_is_401() {
    let (app, _store) = common::build_test_app();
    let response = get(app, "/api/v1/widgets/chat/settings?access_token=").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: a user with no row gets defaults
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_without_row_returns_defaults() {
    let (app, _store) = common::build_test_app();
    let response = get_auth(app, "/api/v1/widgets/chat/settings", USER).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["widget_type"], "chat");
    assert_eq!(json["data"]["settings"], default_settings(WidgetType::Chat));
    assert!(json["data"]["version"].is_null());
}

// ---------------------------------------------------------------------------
// Test: PATCH deep-merges and persists
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_merges_and_persists() {
    let (app, store) = common::build_test_app();

    let response = patch_json_auth(
        app.clone(),
        "/api/v1/widgets/chat/settings",
        USER,
        json!({"display": {"font_size": 24}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["settings"]["display"]["font_size"], 24);
    assert_eq!(json["data"]["settings"]["display"]["max_messages"], 50);
    assert_eq!(json["data"]["version"], 1);

    let response = patch_json_auth(
        app.clone(),
        "/api/v1/widgets/chat/settings",
        USER,
        json!({"filters": {"hide_bots": true}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get_auth(app, "/api/v1/widgets/chat/settings", USER).await).await;
    assert_eq!(json["data"]["settings"]["display"]["font_size"], 24);
    assert_eq!(json["data"]["settings"]["filters"]["hide_bots"], true);
    assert_eq!(json["data"]["version"], 2);

    let row = store
        .select_settings(USER, WidgetType::Chat)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.settings["display"]["font_size"], 24);
}

// ---------------------------------------------------------------------------
// Test: invalid merged settings are 400 with per-field issues
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_patch_is_400_with_issues_and_not_persisted() {
    let (app, store) = common::build_test_app();

    let response = patch_json_auth(
        app,
        "/api/v1/widgets/chat/settings",
        USER,
        json!({"display": {"font_size": 9, "max_messages": 500}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let mut paths: Vec<&str> = json["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["path"].as_str().unwrap())
        .collect();
    paths.sort();
    assert_eq!(paths, vec!["display.font_size", "display.max_messages"]);

    assert!(store
        .select_settings(USER, WidgetType::Chat)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: store failures map to 422 and 503
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_write_is_422() {
    let (app, store) = common::build_test_app();
    store.fail_next_write(StoreError::Rejected {
        message: "row too large".into(),
        cause: Some("widget_settings_size_check".into()),
    });

    let response = patch_json_auth(
        app,
        "/api/v1/widgets/chat/settings",
        USER,
        json!({"display": {"font_size": 20}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "PERSISTENCE_ERROR");
}

#[tokio::test]
async fn unreachable_store_is_503() {
    let (app, store) = common::build_test_app();
    store.set_reachable(false);

    let response = patch_json_auth(
        app,
        "/api/v1/widgets/chat/settings",
        USER,
        json!({"display": {"font_size": 20}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "TRANSPORT_ERROR");
}

// ---------------------------------------------------------------------------
// Test: unknown widget kinds are 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_widget_is_404() {
    let (app, _store) = common::build_test_app();
    let response = get_auth(app, "/api/v1/widgets/clock/settings", USER).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: defaults endpoint is public
// ---------------------------------------------------------------------------

#[tokio::test]
async fn defaults_are_public() {
    let (app, _store) = common::build_test_app();
    let response = get(app, "/api/v1/widgets/visualizer/defaults").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["data"]["settings"],
        default_settings(WidgetType::Visualizer)
    );
}
