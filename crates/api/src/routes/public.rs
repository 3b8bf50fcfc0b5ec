//! Unauthenticated overlay routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;
use crate::ws;

/// Overlay routes mounted at `/public`.
///
/// ```text
/// GET /{username}/{widget}     -> get_public_settings
/// GET /{username}/{widget}/ws  -> overlay_ws_handler
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{username}/{widget}", get(public::get_public_settings))
        .route("/{username}/{widget}/ws", get(ws::overlay_ws_handler))
}
