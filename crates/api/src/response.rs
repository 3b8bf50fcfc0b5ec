//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })`.

use overlay_core::types::Version;
use overlay_core::widget::WidgetType;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Reconciled settings for one widget.
///
/// `version` is `null` when the settings are defaults with no stored row.
#[derive(Debug, Serialize)]
pub struct SettingsPayload {
    pub widget_type: WidgetType,
    pub settings: serde_json::Value,
    pub version: Option<Version>,
}
