use axum::extract::State;
use axum::{routing::get, Json, Router};
use overlay_events::ChannelStatus;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the row store is reachable.
    pub store_healthy: bool,
    /// Realtime channel status as listeners currently see it.
    pub realtime: ChannelStatus,
    /// Open overlay and editor sockets.
    pub ws_connections: usize,
}

/// GET /health -- returns service, store and realtime health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_healthy = state.store.health_check().await.is_ok();
    let realtime = state.hub.status();

    let status = if store_healthy && realtime == ChannelStatus::Subscribed {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store_healthy,
        realtime,
        ws_connections: state.ws_manager.connection_count().await,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
