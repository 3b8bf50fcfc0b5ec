pub mod health;
pub mod public;
pub mod widgets;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /widgets/editor/ws                         editor WebSocket (auth required)
/// /widgets/{widget}/settings                 get, patch (auth required)
/// /widgets/{widget}/defaults                 canonical defaults (public)
///
/// /public/{username}/{widget}                overlay cold load (public)
/// /public/{username}/{widget}/ws             overlay WebSocket (public)
/// ```
///
/// Each tree carries its own CORS layer.
pub fn api_routes(editor_cors: CorsLayer, public_cors: CorsLayer) -> Router<AppState> {
    Router::new()
        // Dashboard settings editor.
        .nest("/widgets", widgets::router().layer(editor_cors))
        // Public overlay pages.
        .nest("/public", public::router().layer(public_cors))
}
