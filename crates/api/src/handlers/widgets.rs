//! Handlers for the dashboard settings editor.
//!
//! Reads and writes go through a per-request settings store, so the HTTP
//! path and the editor socket apply the same merge, validation and
//! reconciliation.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use overlay_client::{dyn_store, DynSettingsStore, SettingsWriter};
use overlay_core::schema::default_settings;
use overlay_core::widget::WidgetType;

use crate::error::AppResult;
use crate::handlers::parse_widget;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, SettingsPayload};
use crate::state::AppState;

/// A read-write store for `widget`, backed by the shared gateway.
pub(crate) fn editor_store(state: &AppState, widget: WidgetType) -> Arc<dyn DynSettingsStore> {
    let writer: Arc<dyn SettingsWriter> = state.gateway.clone();
    dyn_store(
        widget,
        state.gateway.clone(),
        Some(writer),
        state.config.client_config(),
    )
}

/// GET /api/v1/widgets/{widget}/settings
///
/// The caller's reconciled settings; defaults if never saved.
pub async fn get_settings(
    user: AuthUser,
    State(state): State<AppState>,
    Path(widget): Path<String>,
) -> AppResult<impl IntoResponse> {
    let widget = parse_widget(&widget)?;
    let store = editor_store(&state, widget);
    let settings = store.load_for_json(&user.identity).await?;

    Ok(Json(DataResponse {
        data: SettingsPayload {
            widget_type: widget,
            settings,
            version: store.version(),
        },
    }))
}

/// PATCH /api/v1/widgets/{widget}/settings
///
/// Deep-merge a partial over the caller's current settings. The merged
/// result must validate in full; only the partial is sent to the store.
pub async fn update_settings(
    user: AuthUser,
    State(state): State<AppState>,
    Path(widget): Path<String>,
    Json(partial): Json<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let widget = parse_widget(&widget)?;
    let store = editor_store(&state, widget);
    store.load_for_json(&user.identity).await?;

    let settings = store.mutate_json(&user.identity, &partial).await?;

    tracing::info!(
        user_id = user.user_id(),
        widget = %widget,
        version = ?store.version(),
        "Widget settings updated",
    );

    Ok(Json(DataResponse {
        data: SettingsPayload {
            widget_type: widget,
            settings,
            version: store.version(),
        },
    }))
}

/// GET /api/v1/widgets/{widget}/defaults
pub async fn get_defaults(Path(widget): Path<String>) -> AppResult<impl IntoResponse> {
    let widget = parse_widget(&widget)?;
    Ok(Json(DataResponse {
        data: SettingsPayload {
            widget_type: widget,
            settings: default_settings(widget),
            version: None,
        },
    }))
}
