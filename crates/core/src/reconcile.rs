//! Read-time reconciliation of stored or transmitted settings.
//!
//! Every settings read (cold load and live update) goes through
//! [`reconcile`]. The result is always a complete, schema-valid value:
//!
//! - object subtrees are deep-merged, so a stored value missing a newly
//!   added nested field inherits that field from the base;
//! - keys unknown to the schema are dropped;
//! - a wrong-kind leaf, an out-of-set enum string, or an out-of-range number
//!   falls back to the base value at that path while valid siblings survive;
//! - a non-object root (`null`, a string, a number, an array) yields the base.
//!
//! The base is the canonical default on cold load and the previously held
//! value on live updates.

use serde_json::{Map, Value};

use crate::schema::{
    bound_issues, enum_accepts, enum_at, join_path, leaf_accepts, to_json, with_schema, EnumField,
    WidgetSchema,
};
use crate::widget::WidgetType;

/// A reconciled value plus the dotted paths that fell back to the base.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<T> {
    pub value: T,
    /// Paths whose stored value was discarded. `""` means the whole value.
    pub repaired: Vec<String>,
}

/// Merge `stored` over `base`, never failing.
pub fn reconcile<T: WidgetSchema>(base: &T, stored: &Value) -> T {
    reconcile_report(base, stored).value
}

/// Like [`reconcile`], also reporting which paths were repaired.
pub fn reconcile_report<T: WidgetSchema>(base: &T, stored: &Value) -> Reconciled<T> {
    let base_json = to_json(base);
    let mut repaired = Vec::new();
    let mut merged = overlay(&base_json, stored, "", T::enum_fields(), &mut repaired);

    let Ok(candidate) = serde_json::from_value::<T>(merged.clone()) else {
        return whole_base(base);
    };

    let issues = bound_issues(&candidate);
    if issues.is_empty() {
        return Reconciled {
            value: candidate,
            repaired,
        };
    }

    for issue in &issues {
        let pointer = json_pointer(&issue.path);
        let Some(original) = base_json.pointer(&pointer) else {
            return whole_base(base);
        };
        if let Some(slot) = merged.pointer_mut(&pointer) {
            *slot = original.clone();
        }
        repaired.push(issue.path.clone());
    }

    match serde_json::from_value::<T>(merged) {
        Ok(value) if bound_issues(&value).is_empty() => Reconciled { value, repaired },
        _ => whole_base(base),
    }
}

/// Reconcile JSON for a widget chosen at runtime.
///
/// `base` is reconciled over the canonical default first, so a malformed
/// base cannot leak through.
pub fn reconcile_widget(widget: WidgetType, base: &Value, stored: &Value) -> Value {
    with_schema!(widget, S => {
        let base = reconcile(&S::default(), base);
        to_json(&reconcile(&base, stored))
    })
}

/// Cold-load reconciliation for a widget chosen at runtime.
pub fn reconcile_stored(widget: WidgetType, stored: &Value) -> Value {
    with_schema!(widget, S => to_json(&reconcile(&S::default(), stored)))
}

fn whole_base<T: Clone>(base: &T) -> Reconciled<T> {
    Reconciled {
        value: base.clone(),
        repaired: vec![String::new()],
    }
}

fn json_pointer(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("/{}", path.replace('.', "/"))
    }
}

/// Lay `stored` over `base`, keeping only paths present in `base`.
fn overlay(
    base: &Value,
    stored: &Value,
    path: &str,
    enums: &[EnumField],
    repaired: &mut Vec<String>,
) -> Value {
    match base {
        Value::Object(fields) => {
            let Some(obj) = stored.as_object() else {
                if !stored.is_null() {
                    repaired.push(path.to_string());
                }
                return base.clone();
            };
            let mut out = Map::new();
            for (key, base_value) in fields {
                let value = match obj.get(key) {
                    Some(v) => overlay(base_value, v, &join_path(path, key), enums, repaired),
                    None => base_value.clone(),
                };
                out.insert(key.clone(), value);
            }
            Value::Object(out)
        }
        leaf => {
            let enum_ok = enum_at(enums, path).map_or(true, |field| enum_accepts(field, stored));
            if leaf_accepts(leaf, stored) && enum_ok {
                stored.clone()
            } else {
                if !stored.is_null() {
                    repaired.push(path.to_string());
                }
                leaf.clone()
            }
        }
    }
}
