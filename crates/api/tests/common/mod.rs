#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use overlay_api::auth::jwt::{generate_access_token, JwtConfig};
use overlay_api::config::{ServerConfig, StoreBackend};
use overlay_api::router::build_app_router;
use overlay_api::state::AppState;
use overlay_db::{MemoryRowStore, RowStore};
use overlay_events::RealtimeHub;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const TEST_JWT_SECRET: &str = "test-secret-do-not-use-in-production";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses the in-memory store and a short cold-load timeout so timeout paths
/// finish quickly.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        heartbeat_interval_secs: 30,
        cold_load_timeout_ms: 200,
        store_backend: StoreBackend::Memory,
        database_url: None,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router over a fresh in-memory store.
///
/// The realtime hub is pumped from the store's change feed, as in
/// `main.rs`. Returns the store so tests can seed rows and inject failures.
pub fn build_test_app() -> (Router, Arc<MemoryRowStore>) {
    let store = Arc::new(MemoryRowStore::new());
    let hub = Arc::new(RealtimeHub::new());
    let feed = store.subscribe_changes();
    let pump = Arc::clone(&hub);
    tokio::spawn(async move { pump.run(feed, CancellationToken::new()).await });

    let config = test_config();
    let state = AppState::new(store.clone(), hub, config.clone());
    (build_app_router(state, &config), store)
}

/// Serve `app` on an ephemeral local port for socket tests.
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Raw access token for `user_id`, for the `access_token` query parameter.
pub fn access_token(user_id: &str) -> String {
    generate_access_token(user_id, &test_config().jwt).unwrap()
}

/// A valid access token for `user_id`.
pub fn bearer_token(user_id: &str) -> String {
    format!("Bearer {}", access_token(user_id))
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, user_id: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, bearer_token(user_id))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    user_id: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method(Method::PATCH)
        .uri(uri)
        .header(AUTHORIZATION, bearer_token(user_id))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
