//! JSON frames exchanged over the overlay and editor sockets.
//!
//! Every frame is a JSON text message tagged by `type`.

use axum::extract::ws::Message;
use overlay_client::{GatewayError, OverlayState, SettingsError};
use overlay_core::schema::FieldIssue;
use overlay_core::types::Version;
use overlay_core::widget::WidgetType;
use overlay_events::ChannelStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Overlay socket
// ---------------------------------------------------------------------------

/// Overlay lifecycle as reported to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStatus {
    Resolving,
    Loading,
    Live,
    Stale,
    NotFound,
}

/// `{"type": "state", ...}`, sent on mount and on every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "state")]
pub struct OverlayFrame {
    pub status: OverlayStatus,
    /// Present while live or stale.
    pub settings: Option<Value>,
    pub version: Option<Version>,
}

impl<T: Serialize> From<&OverlayState<T>> for OverlayFrame {
    fn from(state: &OverlayState<T>) -> Self {
        let status = match state {
            OverlayState::Resolving { .. } => OverlayStatus::Resolving,
            OverlayState::Loading { .. } => OverlayStatus::Loading,
            OverlayState::Live { .. } => OverlayStatus::Live,
            OverlayState::Stale { .. } => OverlayStatus::Stale,
            OverlayState::NotFound { .. } => OverlayStatus::NotFound,
        };
        let version = match state {
            OverlayState::Live { version, .. } | OverlayState::Stale { version, .. } => *version,
            _ => None,
        };
        Self {
            status,
            settings: state
                .settings()
                .and_then(|s| serde_json::to_value(s).ok()),
            version,
        }
    }
}

// ---------------------------------------------------------------------------
// Editor socket
// ---------------------------------------------------------------------------

/// Requests an editor sends.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorRequest {
    /// Load the caller's settings for `widget` and start receiving changes.
    Load { widget: WidgetType },
    /// Deep-merge `partial` into the caller's settings and persist it.
    Mutate { widget: WidgetType, partial: Value },
}

/// Frames the server sends to an editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorFrame {
    /// Current settings after a load or a remote change.
    Settings {
        widget: WidgetType,
        settings: Value,
        version: Option<Version>,
    },
    /// A mutation was persisted.
    Saved {
        widget: WidgetType,
        settings: Value,
        version: Option<Version>,
    },
    /// A request failed. `settings` is the value the editor should keep
    /// showing; `unsaved` is set once a save has failed.
    Error {
        widget: Option<WidgetType>,
        code: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        issues: Vec<FieldIssue>,
        settings: Option<Value>,
        unsaved: bool,
    },
    /// Realtime channel status changed.
    Status { status: ChannelStatus },
}

impl EditorFrame {
    /// Error frame for a failed settings operation.
    pub fn from_error(
        widget: WidgetType,
        err: &SettingsError,
        settings: Value,
        unsaved: bool,
    ) -> Self {
        let (code, issues) = match err {
            SettingsError::Validation(e) => ("VALIDATION_ERROR", e.issues.clone()),
            SettingsError::Gateway(GatewayError::Transport(_)) => ("TRANSPORT_ERROR", Vec::new()),
            SettingsError::Gateway(GatewayError::Persistence { .. }) => {
                ("PERSISTENCE_ERROR", Vec::new())
            }
            SettingsError::Gateway(GatewayError::Resolution(_)) => ("NOT_FOUND", Vec::new()),
            SettingsError::ReadOnly(_) => ("INTERNAL_ERROR", Vec::new()),
        };
        EditorFrame::Error {
            widget: Some(widget),
            code,
            message: err.to_string(),
            issues,
            settings: Some(settings),
            unsaved,
        }
    }

    /// Error frame for a message that is not a valid request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        EditorFrame::Error {
            widget: None,
            code: "BAD_REQUEST",
            message: message.into(),
            issues: Vec::new(),
            settings: None,
            unsaved: false,
        }
    }
}

/// Serialize a frame into a text message.
pub fn to_message<F: Serialize>(frame: &F) -> Option<Message> {
    match serde_json::to_string(frame) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize WebSocket frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_core::schema::{SchemaError, StatsSettings};
    use serde_json::json;

    #[test]
    fn overlay_frame_carries_settings_only_when_rendering() {
        let loading: OverlayState<StatsSettings> = OverlayState::Loading {
            user_id: "u1".into(),
        };
        let frame = OverlayFrame::from(&loading);
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"type": "state", "status": "loading", "settings": null, "version": null})
        );

        let stale = OverlayState::Stale {
            user_id: "u1".into(),
            settings: StatsSettings::default(),
            version: Some(4),
        };
        let frame = OverlayFrame::from(&stale);
        assert_eq!(frame.status, OverlayStatus::Stale);
        assert_eq!(frame.version, Some(4));
        assert_eq!(
            frame.settings,
            Some(serde_json::to_value(StatsSettings::default()).unwrap())
        );
    }

    #[test]
    fn not_found_serializes_snake_case() {
        let state: OverlayState<StatsSettings> = OverlayState::NotFound {
            username: "ghost".into(),
        };
        let json = serde_json::to_value(OverlayFrame::from(&state)).unwrap();
        assert_eq!(json["status"], "not_found");
    }

    #[test]
    fn editor_requests_parse() {
        let load: EditorRequest = serde_json::from_str(r#"{"type":"load","widget":"chat"}"#).unwrap();
        assert_eq!(load, EditorRequest::Load { widget: WidgetType::Chat });

        let mutate: EditorRequest = serde_json::from_str(
            r#"{"type":"mutate","widget":"stats","partial":{"a":1}}"#,
        )
        .unwrap();
        assert_eq!(
            mutate,
            EditorRequest::Mutate {
                widget: WidgetType::Stats,
                partial: json!({"a": 1}),
            }
        );

        assert!(serde_json::from_str::<EditorRequest>(r#"{"type":"load","widget":"clock"}"#).is_err());
    }

    #[test]
    fn validation_error_frame_lists_issues() {
        let err = SettingsError::Validation(SchemaError::new(
            WidgetType::Chat,
            vec![FieldIssue::new("display.font_size", "out of range")],
        ));
        let frame = EditorFrame::from_error(WidgetType::Chat, &err, json!({}), true);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["issues"][0]["path"], "display.font_size");
        assert_eq!(json["unsaved"], true);
    }

    #[test]
    fn transport_error_frame_omits_issues() {
        let err = SettingsError::Gateway(GatewayError::Transport("down".into()));
        let frame = EditorFrame::from_error(WidgetType::Chat, &err, json!({}), true);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["code"], "TRANSPORT_ERROR");
        assert!(json.get("issues").is_none());
    }
}
