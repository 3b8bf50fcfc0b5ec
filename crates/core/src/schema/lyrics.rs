//! Synced lyrics widget settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{EnumField, WidgetSchema};
use crate::widget::WidgetType;

string_enum! {
    Alignment { Left => "left", Center => "center", Right => "right" } default Center
}

string_enum! {
    LineAnimation {
        Off => "none",
        Fade => "fade",
        Slide => "slide",
        Karaoke => "karaoke",
    } default Fade
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct LyricsSettings {
    #[validate(nested)]
    pub display: LyricsDisplay,
    #[validate(nested)]
    pub behavior: LyricsBehavior,
    #[validate(nested)]
    pub background: LyricsBackground,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LyricsDisplay {
    #[validate(range(min = 12, max = 120))]
    pub font_size: i32,
    #[validate(range(min = 1.0, max = 3.0))]
    pub line_height: f64,
    pub alignment: Alignment,
    #[validate(range(min = 1, max = 12))]
    pub max_lines: i32,
    pub text_color: String,
    pub highlight_color: String,
}

impl Default for LyricsDisplay {
    fn default() -> Self {
        Self {
            font_size: 32,
            line_height: 1.4,
            alignment: Alignment::default(),
            max_lines: 3,
            text_color: "#ffffff".to_string(),
            highlight_color: "#1db954".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LyricsBehavior {
    /// Shift applied to line timings; negative shows lines earlier.
    #[validate(range(min = -5000, max = 5000))]
    pub sync_offset_ms: i32,
    pub show_translation: bool,
    pub animation: LineAnimation,
}

impl Default for LyricsBehavior {
    fn default() -> Self {
        Self {
            sync_offset_ms: 0,
            show_translation: false,
            animation: LineAnimation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LyricsBackground {
    pub color: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub opacity: f64,
}

impl Default for LyricsBackground {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            opacity: 0.0,
        }
    }
}

const ENUM_FIELDS: &[EnumField] = &[
    EnumField {
        path: "display.alignment",
        allowed: Alignment::ALLOWED,
    },
    EnumField {
        path: "behavior.animation",
        allowed: LineAnimation::ALLOWED,
    },
];

impl WidgetSchema for LyricsSettings {
    const WIDGET: WidgetType = WidgetType::Lyrics;

    fn enum_fields() -> &'static [EnumField] {
        ENUM_FIELDS
    }
}
