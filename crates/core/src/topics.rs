//! Realtime topic and event name conventions.
//!
//! These must match between the change-feed pump, the realtime hub, and
//! the WebSocket frames sent to overlay and editor clients.

use crate::widget::WidgetType;

/// Event emitted when a widget's stored settings changed.
pub const EVENT_SETTINGS_CHANGED: &str = "settings-changed";

/// Event emitted when the channel's connection status changed.
pub const EVENT_STATUS: &str = "status";

/// Topic suffix separating the widget kind from the user id.
const TOPIC_SUFFIX: &str = "-settings:";

/// Topic carrying settings changes for one widget of one user,
/// e.g. `"visualizer-settings:user-1"`.
pub fn settings_topic(widget: WidgetType, user_id: &str) -> String {
    format!("{}{TOPIC_SUFFIX}{user_id}", widget.as_str())
}

/// Split a settings topic back into its widget kind and user id.
pub fn parse_settings_topic(topic: &str) -> Option<(WidgetType, &str)> {
    let (widget, user_id) = topic.split_once(TOPIC_SUFFIX)?;
    if user_id.is_empty() {
        return None;
    }
    Some((widget.parse().ok()?, user_id))
}
