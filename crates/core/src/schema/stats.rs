//! Channel stats widget settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{EnumField, WidgetSchema};
use crate::widget::WidgetType;

string_enum! {
    StatsLayout {
        Horizontal => "horizontal",
        Vertical => "vertical",
        Grid => "grid",
    } default Horizontal
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct StatsSettings {
    #[validate(nested)]
    pub display: StatsDisplay,
    pub metrics: StatsMetrics,
    #[validate(nested)]
    pub behavior: StatsBehavior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StatsDisplay {
    pub layout: StatsLayout,
    #[validate(range(min = 10, max = 96))]
    pub font_size: i32,
    pub text_color: String,
    pub background_color: String,
}

impl Default for StatsDisplay {
    fn default() -> Self {
        Self {
            layout: StatsLayout::default(),
            font_size: 20,
            text_color: "#ffffff".to_string(),
            background_color: "#00000080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsMetrics {
    pub show_viewers: bool,
    pub show_followers: bool,
    pub show_uptime: bool,
    pub show_subscribers: bool,
}

impl Default for StatsMetrics {
    fn default() -> Self {
        Self {
            show_viewers: true,
            show_followers: true,
            show_uptime: true,
            show_subscribers: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StatsBehavior {
    #[validate(range(min = 5, max = 3600))]
    pub refresh_interval_secs: i32,
}

impl Default for StatsBehavior {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
        }
    }
}

const ENUM_FIELDS: &[EnumField] = &[EnumField {
    path: "display.layout",
    allowed: StatsLayout::ALLOWED,
}];

impl WidgetSchema for StatsSettings {
    const WIDGET: WidgetType = WidgetType::Stats;

    fn enum_fields() -> &'static [EnumField] {
        ENUM_FIELDS
    }
}
