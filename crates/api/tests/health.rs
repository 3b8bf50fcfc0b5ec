//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let (app, _store) = common::build_test_app();
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);
    assert_eq!(json["realtime"], "subscribed");
    assert_eq!(json["ws_connections"], 0);
}

// ---------------------------------------------------------------------------
// Test: an unreachable store reports degraded
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_store_reports_degraded() {
    let (app, store) = common::build_test_app();
    store.set_reachable(false);

    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["store_healthy"], false);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (app, _store) = common::build_test_app();
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let (app, _store) = common::build_test_app();
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Test: CORS differs between overlay and editor routes
// ---------------------------------------------------------------------------

async fn preflight(
    app: axum::Router,
    uri: &str,
    origin: &str,
    method: &str,
) -> axum::response::Response {
    let request = axum::http::Request::builder()
        .method(axum::http::Method::OPTIONS)
        .uri(uri)
        .header("origin", origin)
        .header("access-control-request-method", method)
        .body(axum::body::Body::empty())
        .unwrap();
    tower::ServiceExt::oneshot(app, request).await.unwrap()
}

#[tokio::test]
async fn public_routes_allow_any_origin_without_credentials() {
    let (app, _store) = common::build_test_app();
    let response = preflight(app, "/api/v1/public/streamer/chat", "https://obs.example", "GET").await;

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.get("access-control-allow-credentials").is_none());
}

#[tokio::test]
async fn editor_routes_only_allow_configured_origins() {
    let (app, _store) = common::build_test_app();

    let foreign = preflight(
        app.clone(),
        "/api/v1/widgets/chat/settings",
        "https://obs.example",
        "PATCH",
    )
    .await;
    assert!(foreign.headers().get("access-control-allow-origin").is_none());

    let dashboard = preflight(
        app,
        "/api/v1/widgets/chat/settings",
        "http://localhost:5173",
        "PATCH",
    )
    .await;
    let headers = dashboard.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
    assert_eq!(headers["access-control-allow-credentials"], "true");
}
