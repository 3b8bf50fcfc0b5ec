//! Chat box widget settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{EnumField, FieldIssue, WidgetSchema};
use crate::widget::WidgetType;

string_enum! {
    FlowDirection { Up => "up", Down => "down" } default Up
}

/// Longest single blocked word accepted.
pub const MAX_BLOCKED_WORD_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct ChatSettings {
    #[validate(nested)]
    pub display: ChatDisplay,
    pub colors: ChatColors,
    #[validate(nested)]
    pub filters: ChatFilters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ChatDisplay {
    #[validate(range(min = 10, max = 72))]
    pub font_size: i32,
    #[validate(range(min = 1, max = 200))]
    pub max_messages: i32,
    /// Zero keeps messages until they scroll out.
    #[validate(range(min = 0, max = 600))]
    pub message_lifetime_secs: i32,
    pub show_badges: bool,
    pub show_avatars: bool,
    pub direction: FlowDirection,
}

impl Default for ChatDisplay {
    fn default() -> Self {
        Self {
            font_size: 18,
            max_messages: 50,
            message_lifetime_secs: 0,
            show_badges: true,
            show_avatars: false,
            direction: FlowDirection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatColors {
    pub background: String,
    pub text: String,
    pub username: String,
}

impl Default for ChatColors {
    fn default() -> Self {
        Self {
            background: "transparent".to_string(),
            text: "#ffffff".to_string(),
            username: "#9147ff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct ChatFilters {
    pub hide_commands: bool,
    pub hide_bots: bool,
    #[validate(length(max = 100))]
    pub blocked_words: Vec<String>,
}

const ENUM_FIELDS: &[EnumField] = &[EnumField {
    path: "display.direction",
    allowed: FlowDirection::ALLOWED,
}];

impl WidgetSchema for ChatSettings {
    const WIDGET: WidgetType = WidgetType::Chat;

    fn enum_fields() -> &'static [EnumField] {
        ENUM_FIELDS
    }

    fn check_extra(&self, issues: &mut Vec<FieldIssue>) {
        let too_long = self
            .filters
            .blocked_words
            .iter()
            .any(|w| w.is_empty() || w.len() > MAX_BLOCKED_WORD_LENGTH);
        if too_long {
            issues.push(FieldIssue::new(
                "filters.blocked_words",
                format!("words must be 1 to {MAX_BLOCKED_WORD_LENGTH} characters"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_settings;
    use serde_json::json;

    #[test]
    fn blocked_words_must_be_strings() {
        let mut json = serde_json::to_value(ChatSettings::default()).unwrap();
        json["filters"]["blocked_words"] = json!(["spam", 3]);
        let err = validate_settings::<ChatSettings>(&json).unwrap_err();
        assert_eq!(err.paths(), vec!["filters.blocked_words"]);
    }

    #[test]
    fn blocked_word_length_is_checked() {
        let mut json = serde_json::to_value(ChatSettings::default()).unwrap();
        json["filters"]["blocked_words"] = json!([""]);
        assert!(validate_settings::<ChatSettings>(&json).is_err());
        json["filters"]["blocked_words"] = json!(["spam", "scam"]);
        let settings = validate_settings::<ChatSettings>(&json).unwrap();
        assert_eq!(settings.filters.blocked_words, vec!["spam", "scam"]);
    }
}
