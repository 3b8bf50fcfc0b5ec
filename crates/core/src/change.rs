//! The snapshot carried by the change feed and the realtime channel.

use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, UserId, Version};
use crate::widget::WidgetType;

/// A committed settings row, as fanned out after every upsert.
///
/// `settings` is the stored JSON after the merge, which may still be a
/// partial or legacy shape; receivers reconcile it before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsChange {
    pub user_id: UserId,
    pub widget_type: WidgetType,
    pub settings: serde_json::Value,
    pub version: Version,
    pub updated_at: Timestamp,
}
