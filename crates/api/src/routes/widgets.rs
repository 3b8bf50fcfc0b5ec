//! Route definitions for the dashboard settings editor.

use axum::routing::get;
use axum::Router;

use crate::handlers::widgets;
use crate::state::AppState;
use crate::ws;

/// Editor routes mounted at `/widgets`.
///
/// ```text
/// GET   /editor/ws           -> editor_ws_handler
/// GET   /{widget}/settings   -> get_settings
/// PATCH /{widget}/settings   -> update_settings
/// GET   /{widget}/defaults   -> get_defaults
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/editor/ws", get(ws::editor_ws_handler))
        .route(
            "/{widget}/settings",
            get(widgets::get_settings).patch(widgets::update_settings),
        )
        .route("/{widget}/defaults", get(widgets::get_defaults))
}
