//! Follower / subscription / donation alert widget settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{EnumField, WidgetSchema};
use crate::widget::WidgetType;

string_enum! {
    AlertPosition { Top => "top", Center => "center", Bottom => "bottom" } default Top
}

string_enum! {
    EnterAnimation {
        Fade => "fade",
        Slide => "slide",
        Zoom => "zoom",
        Bounce => "bounce",
    } default Slide
}

string_enum! {
    ExitAnimation { Fade => "fade", Slide => "slide", Zoom => "zoom" } default Fade
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct AlertsSettings {
    #[validate(nested)]
    pub general: AlertsGeneral,
    pub animation: AlertsAnimation,
    #[validate(nested)]
    pub text: AlertsText,
    pub events: AlertEvents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AlertsGeneral {
    #[validate(range(min = 1, max = 60))]
    pub duration_secs: i32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub volume: f64,
    pub position: AlertPosition,
}

impl Default for AlertsGeneral {
    fn default() -> Self {
        Self {
            duration_secs: 6,
            volume: 0.5,
            position: AlertPosition::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertsAnimation {
    pub enter: EnterAnimation,
    pub exit: ExitAnimation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AlertsText {
    #[validate(range(min = 12, max = 120))]
    pub size: i32,
    pub color: String,
    /// `{name}` and `{amount}` are substituted at render time.
    #[validate(length(max = 280))]
    pub template: String,
}

impl Default for AlertsText {
    fn default() -> Self {
        Self {
            size: 36,
            color: "#ffffff".to_string(),
            template: "{name} just followed!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvents {
    pub follows: bool,
    pub subscriptions: bool,
    pub donations: bool,
    pub raids: bool,
}

impl Default for AlertEvents {
    fn default() -> Self {
        Self {
            follows: true,
            subscriptions: true,
            donations: true,
            raids: false,
        }
    }
}

const ENUM_FIELDS: &[EnumField] = &[
    EnumField {
        path: "general.position",
        allowed: AlertPosition::ALLOWED,
    },
    EnumField {
        path: "animation.enter",
        allowed: EnterAnimation::ALLOWED,
    },
    EnumField {
        path: "animation.exit",
        allowed: ExitAnimation::ALLOWED,
    },
];

impl WidgetSchema for AlertsSettings {
    const WIDGET: WidgetType = WidgetType::Alerts;

    fn enum_fields() -> &'static [EnumField] {
        ENUM_FIELDS
    }
}
