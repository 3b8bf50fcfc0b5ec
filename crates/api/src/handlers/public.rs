//! Unauthenticated overlay reads.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use overlay_client::{dyn_store, GatewayError, SettingsReader};

use crate::error::AppResult;
use crate::handlers::parse_widget;
use crate::response::{DataResponse, SettingsPayload};
use crate::state::AppState;

/// GET /api/v1/public/{username}/{widget}
///
/// Cold load for an overlay page. Unknown usernames are 404; a user with
/// no stored row, or a row that cannot be read in time, gets defaults.
pub async fn get_public_settings(
    State(state): State<AppState>,
    Path((username, widget)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let widget = parse_widget(&widget)?;
    let user_id = state
        .gateway
        .resolve_username(&username)
        .await?
        .ok_or_else(|| GatewayError::Resolution(username.clone()))?;

    let store = dyn_store(widget, state.gateway.clone(), None, state.config.client_config());
    let settings = store.load_public_json(&user_id).await;

    Ok(Json(DataResponse {
        data: SettingsPayload {
            widget_type: widget,
            settings,
            version: store.version(),
        },
    }))
}
