//! Audio visualizer widget settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{EnumField, FieldIssue, WidgetSchema};
use crate::widget::WidgetType;

string_enum! {
    BackgroundMode {
        Solid => "solid",
        Gradient => "gradient",
        Transparent => "transparent",
        Image => "image",
    } default Transparent
}

string_enum! {
    FontWeight { Light => "light", Normal => "normal", Bold => "bold" } default Normal
}

string_enum! {
    VisualizerStyle { Bars => "bars", Wave => "wave", Circle => "circle", Line => "line" } default Bars
}

string_enum! {
    AudioSource { System => "system", Microphone => "microphone", Spotify => "spotify" } default System
}

/// FFT window sizes the renderer supports.
pub const FFT_SIZES: [i32; 8] = [256, 512, 1024, 2048, 4096, 8192, 16384, 32768];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct VisualizerSettings {
    #[validate(nested)]
    pub visual: VisualSettings,
    #[validate(nested)]
    pub functional: FunctionalSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct VisualSettings {
    #[validate(nested)]
    pub background: BackgroundSettings,
    #[validate(nested)]
    pub text: TextSettings,
    #[validate(nested)]
    pub border: BorderSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BackgroundSettings {
    pub mode: BackgroundMode,
    pub color: String,
    /// Second stop, used when `mode` is `gradient`.
    pub gradient_to: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub opacity: f64,
    /// Used when `mode` is `image`; empty means none.
    pub image_url: String,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            mode: BackgroundMode::default(),
            color: "#000000".to_string(),
            gradient_to: "#1f1f1f".to_string(),
            opacity: 0.8,
            image_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TextSettings {
    #[validate(range(min = 8, max = 96))]
    pub size: i32,
    pub color: String,
    pub font_family: String,
    pub weight: FontWeight,
    pub shadow: bool,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            size: 16,
            color: "#ffffff".to_string(),
            font_family: "Inter".to_string(),
            weight: FontWeight::default(),
            shadow: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BorderSettings {
    pub enabled: bool,
    #[validate(range(min = 0, max = 20))]
    pub width: i32,
    pub color: String,
    #[validate(range(min = 0, max = 64))]
    pub radius: i32,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            width: 2,
            color: "#ffffff".to_string(),
            radius: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct FunctionalSettings {
    #[validate(nested)]
    pub visualizer: VisualizerOptions,
    #[validate(nested)]
    pub behavior: BehaviorSettings,
    #[validate(nested)]
    pub audio: AudioSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VisualizerOptions {
    pub style: VisualizerStyle,
    #[validate(range(min = 8, max = 256))]
    pub bar_count: i32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub smoothing: f64,
    #[validate(range(min = 0.1, max = 5.0))]
    pub sensitivity: f64,
    pub mirror: bool,
}

impl Default for VisualizerOptions {
    fn default() -> Self {
        Self {
            style: VisualizerStyle::default(),
            bar_count: 64,
            smoothing: 0.7,
            sensitivity: 1.0,
            mirror: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BehaviorSettings {
    pub show_track_info: bool,
    pub show_album_art: bool,
    pub auto_hide: bool,
    #[validate(range(min = 1, max = 120))]
    pub hide_delay_secs: i32,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            show_track_info: true,
            show_album_art: true,
            auto_hide: false,
            hide_delay_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AudioSettings {
    pub source: AudioSource,
    #[validate(range(min = 0.0, max = 4.0))]
    pub gain: f64,
    pub fft_size: i32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            source: AudioSource::default(),
            gain: 1.0,
            fft_size: 2048,
        }
    }
}

const ENUM_FIELDS: &[EnumField] = &[
    EnumField {
        path: "visual.background.mode",
        allowed: BackgroundMode::ALLOWED,
    },
    EnumField {
        path: "visual.text.weight",
        allowed: FontWeight::ALLOWED,
    },
    EnumField {
        path: "functional.visualizer.style",
        allowed: VisualizerStyle::ALLOWED,
    },
    EnumField {
        path: "functional.audio.source",
        allowed: AudioSource::ALLOWED,
    },
];

impl WidgetSchema for VisualizerSettings {
    const WIDGET: WidgetType = WidgetType::Visualizer;

    fn enum_fields() -> &'static [EnumField] {
        ENUM_FIELDS
    }

    fn check_extra(&self, issues: &mut Vec<FieldIssue>) {
        if !FFT_SIZES.contains(&self.functional.audio.fft_size) {
            issues.push(FieldIssue::new(
                "functional.audio.fft_size",
                "must be a power of two between 256 and 32768",
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
    fn default_has_documented_nesting() {
        let json = serde_json::to_value(VisualizerSettings::default()).unwrap();
        for pointer in [
            "/visual/background",
            "/visual/text",
            "/visual/border",
            "/functional/visualizer",
            "/functional/behavior",
            "/functional/audio",
        ] {
            assert!(json.pointer(pointer).is_some_and(|v| v.is_object()), "{pointer}");
        }
    }

    #[test]
    fn fft_size_outside_set_is_rejected() {
        let mut json = serde_json::to_value(VisualizerSettings::default()).unwrap();
        json["functional"]["audio"]["fft_size"] = json!(1000);
        let err = validate_settings::<VisualizerSettings>(&json).unwrap_err();
        assert_eq!(err.paths(), vec!["functional.audio.fft_size"]);
    }

    #[test]
    fn sensitivity_lower_bound_is_inclusive() {
        let mut json = serde_json::to_value(VisualizerSettings::default()).unwrap();
        json["functional"]["visualizer"]["sensitivity"] = json!(0.1);
        assert!(validate_settings::<VisualizerSettings>(&json).is_ok());
        json["functional"]["visualizer"]["sensitivity"] = json!(0.05);
        assert!(validate_settings::<VisualizerSettings>(&json).is_err());
    }
}
