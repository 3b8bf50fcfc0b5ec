//! Events delivered on a realtime topic.

use overlay_core::change::SettingsChange;
use overlay_core::topics::{EVENT_SETTINGS_CHANGED, EVENT_STATUS};
use serde::{Deserialize, Serialize};

/// Connection status of the channel as seen by a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    /// The upstream feed is down and being re-established.
    Connecting,
    /// Live: changes are being delivered.
    Subscribed,
    /// The listener released its subscription.
    Closed,
}

/// One event on a topic, serialized as `{"event": <name>, "payload": …}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum ChannelEvent {
    SettingsChanged(SettingsChange),
    Status(ChannelStatus),
}

impl ChannelEvent {
    /// The wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelEvent::SettingsChanged(_) => EVENT_SETTINGS_CHANGED,
            ChannelEvent::Status(_) => EVENT_STATUS,
        }
    }
}
