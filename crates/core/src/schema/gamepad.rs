//! Gamepad input display widget settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{EnumField, WidgetSchema};
use crate::widget::WidgetType;

string_enum! {
    ControllerLayout {
        Xbox => "xbox",
        PlayStation => "playstation",
        Switch => "switch",
        Generic => "generic",
    } default Xbox
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct GamepadSettings {
    #[validate(nested)]
    pub layout: GamepadLayout,
    pub colors: GamepadColors,
    #[validate(nested)]
    pub behavior: GamepadBehavior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GamepadLayout {
    pub controller: ControllerLayout,
    #[validate(range(min = 0.25, max = 4.0))]
    pub scale: f64,
    pub show_sticks: bool,
    pub show_triggers: bool,
}

impl Default for GamepadLayout {
    fn default() -> Self {
        Self {
            controller: ControllerLayout::default(),
            scale: 1.0,
            show_sticks: true,
            show_triggers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamepadColors {
    pub base: String,
    pub pressed: String,
    pub stick: String,
}

impl Default for GamepadColors {
    fn default() -> Self {
        Self {
            base: "#2b2b2b".to_string(),
            pressed: "#4f9dff".to_string(),
            stick: "#dddddd".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GamepadBehavior {
    #[validate(range(min = 0.0, max = 0.5))]
    pub deadzone: f64,
    #[validate(range(min = 4, max = 100))]
    pub poll_interval_ms: i32,
}

impl Default for GamepadBehavior {
    fn default() -> Self {
        Self {
            deadzone: 0.1,
            poll_interval_ms: 16,
        }
    }
}

const ENUM_FIELDS: &[EnumField] = &[EnumField {
    path: "layout.controller",
    allowed: ControllerLayout::ALLOWED,
}];

impl WidgetSchema for GamepadSettings {
    const WIDGET: WidgetType = WidgetType::Gamepad;

    fn enum_fields() -> &'static [EnumField] {
        ENUM_FIELDS
    }
}
