//! Per-widget settings schemas, canonical defaults, and strict validation.
//!
//! Every widget's settings are a statically known nested record. Numeric
//! bounds are declared with `validator` range rules, closed string sets are
//! Rust enums listed in [`WidgetSchema::enum_fields`], and color strings are
//! free text that passes through unvalidated.
//!
//! [`validate_settings`] is strict: it reports every failing dotted field
//! path and never clamps. The lenient counterpart used on reads lives in
//! [`crate::reconcile`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::widget::WidgetType;

/// Define a closed set of string values backed by a Rust enum.
///
/// Generates the serde renames, `ALLOWED` (the wire values in declaration
/// order), `as_str`, and `Default`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $value:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub const ALLOWED: &'static [&'static str] = &[$($value),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
}

pub mod alerts;
pub mod chat;
pub mod gamepad;
pub mod lyrics;
pub mod stats;
pub mod visualizer;

pub use alerts::AlertsSettings;
pub use chat::ChatSettings;
pub use gamepad::GamepadSettings;
pub use lyrics::LyricsSettings;
pub use stats::StatsSettings;
pub use visualizer::VisualizerSettings;

// ---------------------------------------------------------------------------
// Schema trait
// ---------------------------------------------------------------------------

/// A closed-set string field, addressed by dotted path from the root.
#[derive(Debug, Clone, Copy)]
pub struct EnumField {
    pub path: &'static str,
    pub allowed: &'static [&'static str],
}

/// Implemented by the root settings record of every widget.
///
/// `Default` is the canonical default: a complete instance with no
/// placeholder leaves.
pub trait WidgetSchema:
    Serialize + DeserializeOwned + Validate + Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    const WIDGET: WidgetType;

    /// Closed-set string fields of this schema.
    fn enum_fields() -> &'static [EnumField] {
        &[]
    }

    /// Rules the `validator` derive cannot express (e.g. numeric sets).
    fn check_extra(&self, _issues: &mut Vec<FieldIssue>) {}
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// One failing field, identified by dotted path (`""` is the root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Structured validation failure enumerating every failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{widget} settings failed validation: {}", summarize(.issues))]
pub struct SchemaError {
    pub widget: WidgetType,
    pub issues: Vec<FieldIssue>,
}

impl SchemaError {
    pub fn new(widget: WidgetType, issues: Vec<FieldIssue>) -> Self {
        Self { widget, issues }
    }

    /// Dotted paths of the failing fields.
    pub fn paths(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.path.as_str()).collect()
    }
}

fn summarize(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| {
            let path = if i.path.is_empty() { "<root>" } else { &i.path };
            format!("{path}: {}", i.message)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate an arbitrary JSON value as a complete `T`.
///
/// Unknown extra keys are ignored. Missing fields, wrong JSON kinds,
/// out-of-set enum strings, and out-of-range numbers are all reported.
pub fn validate_settings<T: WidgetSchema>(value: &Value) -> Result<T, SchemaError> {
    let default = to_json(&T::default());

    let mut issues = Vec::new();
    check_shape(&default, value, "", T::enum_fields(), &mut issues);
    if !issues.is_empty() {
        issues.sort_by(|a, b| a.path.cmp(&b.path));
        return Err(SchemaError::new(T::WIDGET, issues));
    }

    let typed: T = serde_json::from_value(value.clone())
        .map_err(|e| SchemaError::new(T::WIDGET, vec![FieldIssue::new("", e.to_string())]))?;

    let issues = bound_issues(&typed);
    if !issues.is_empty() {
        return Err(SchemaError::new(T::WIDGET, issues));
    }

    Ok(typed)
}

/// Range and extra-rule failures of an already typed value.
pub(crate) fn bound_issues<T: WidgetSchema>(value: &T) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    if let Err(errors) = value.validate() {
        collect_validation_issues(&errors, "", &mut issues);
    }
    value.check_extra(&mut issues);
    issues.sort_by(|a, b| a.path.cmp(&b.path));
    issues
}

fn collect_validation_issues(errors: &ValidationErrors, prefix: &str, issues: &mut Vec<FieldIssue>) {
    for (field, kind) in errors.errors() {
        let path = join_path(prefix, &field.to_string());
        match kind {
            ValidationErrorsKind::Struct(inner) => collect_validation_issues(inner, &path, issues),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_issues(inner, &format!("{path}[{index}]"), issues);
                }
            }
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    issues.push(FieldIssue::new(path.clone(), describe(err)));
                }
            }
        }
    }
}

fn describe(err: &validator::ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }
    let param = |name: &str| {
        err.params
            .get(name)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    match &*err.code {
        "range" => format!("must be between {} and {}", param("min"), param("max")),
        "length" => format!("length must be at most {}", param("max")),
        code => code.to_string(),
    }
}

/// Walk `candidate` against the JSON shape of the canonical default.
fn check_shape(
    default: &Value,
    candidate: &Value,
    path: &str,
    enums: &[EnumField],
    issues: &mut Vec<FieldIssue>,
) {
    match default {
        Value::Object(fields) => {
            let Some(obj) = candidate.as_object() else {
                issues.push(FieldIssue::new(path, "expected object"));
                return;
            };
            for (key, field_default) in fields {
                let child = join_path(path, key);
                match obj.get(key) {
                    Some(value) => check_shape(field_default, value, &child, enums, issues),
                    None => issues.push(FieldIssue::new(child, "missing field")),
                }
            }
        }
        leaf => {
            if !leaf_accepts(leaf, candidate) {
                issues.push(FieldIssue::new(path, format!("expected {}", kind_name(leaf))));
            } else if let Some(field) = enum_at(enums, path) {
                if !enum_accepts(field, candidate) {
                    issues.push(FieldIssue::new(
                        path,
                        format!("must be one of: {}", field.allowed.join(", ")),
                    ));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Shape helpers (shared with reconcile)
// ---------------------------------------------------------------------------

pub(crate) fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Whether `candidate` has the same JSON kind as the default leaf.
///
/// Integer leaves accept only integers that fit in `i32`. Lists in widget
/// schemas are string lists, so an empty default list accepts strings.
pub(crate) fn leaf_accepts(default: &Value, candidate: &Value) -> bool {
    match (default, candidate) {
        (Value::Bool(_), Value::Bool(_)) | (Value::String(_), Value::String(_)) => true,
        (Value::Number(d), Value::Number(c)) => {
            if d.is_f64() {
                true
            } else {
                c.as_i64().is_some_and(|n| i32::try_from(n).is_ok())
            }
        }
        (Value::Array(d), Value::Array(items)) => items.iter().all(|item| match d.first() {
            Some(first) => leaf_accepts(first, item),
            None => item.is_string(),
        }),
        _ => false,
    }
}

pub(crate) fn enum_at<'a>(enums: &'a [EnumField], path: &str) -> Option<&'a EnumField> {
    enums.iter().find(|f| f.path == path)
}

pub(crate) fn enum_accepts(field: &EnumField, candidate: &Value) -> bool {
    candidate
        .as_str()
        .is_some_and(|s| field.allowed.contains(&s))
}

fn kind_name(leaf: &Value) -> &'static str {
    match leaf {
        Value::Bool(_) => "boolean",
        Value::String(_) => "string",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::Array(_) => "list of strings",
        Value::Object(_) => "object",
        Value::Null => "null",
    }
}

// ---------------------------------------------------------------------------
// Dynamic dispatch by widget kind
// ---------------------------------------------------------------------------

/// Run `$body` with `$schema` bound to the settings type of `$widget`.
macro_rules! with_schema {
    ($widget:expr, $schema:ident => $body:expr) => {
        match $widget {
            $crate::widget::WidgetType::Visualizer => {
                type $schema = $crate::schema::VisualizerSettings;
                $body
            }
            $crate::widget::WidgetType::Lyrics => {
                type $schema = $crate::schema::LyricsSettings;
                $body
            }
            $crate::widget::WidgetType::Gamepad => {
                type $schema = $crate::schema::GamepadSettings;
                $body
            }
            $crate::widget::WidgetType::Chat => {
                type $schema = $crate::schema::ChatSettings;
                $body
            }
            $crate::widget::WidgetType::Alerts => {
                type $schema = $crate::schema::AlertsSettings;
                $body
            }
            $crate::widget::WidgetType::Stats => {
                type $schema = $crate::schema::StatsSettings;
                $body
            }
        }
    };
}
pub(crate) use with_schema;

/// Canonical default of `widget`, as JSON.
pub fn default_settings(widget: WidgetType) -> Value {
    with_schema!(widget, S => to_json(&S::default()))
}

/// Validate `value` as complete settings for `widget`, returning the
/// normalized JSON (unknown keys removed).
pub fn validate_widget(widget: WidgetType, value: &Value) -> Result<Value, SchemaError> {
    with_schema!(widget, S => validate_settings::<S>(value).map(|typed| to_json(&typed)))
}
