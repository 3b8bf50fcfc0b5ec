//! The closed set of overlay widget kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One overlay widget kind. Each has its own settings schema.
///
/// Serialized lowercase, which is also the form used in route segments
/// (`/{username}/{widget}`) and topic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Visualizer,
    Lyrics,
    Gamepad,
    Chat,
    Alerts,
    Stats,
}

impl WidgetType {
    /// Every widget kind, in display order.
    pub const ALL: [WidgetType; 6] = [
        WidgetType::Visualizer,
        WidgetType::Lyrics,
        WidgetType::Gamepad,
        WidgetType::Chat,
        WidgetType::Alerts,
        WidgetType::Stats,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetType::Visualizer => "visualizer",
            WidgetType::Lyrics => "lyrics",
            WidgetType::Gamepad => "gamepad",
            WidgetType::Chat => "chat",
            WidgetType::Alerts => "alerts",
            WidgetType::Stats => "stats",
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetType::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| CoreError::NotFound {
                entity: "widget",
                key: s.to_string(),
            })
    }
}
