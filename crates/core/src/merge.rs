//! Raw JSON deep merge used for partial settings patches.
//!
//! Mirrors the `jsonb_deep_merge` SQL function applied by the row-store on
//! upsert, so an optimistic local merge produces the same document the
//! store will hold after the write lands.

use serde_json::Value;

/// Merge `patch` into `target` in place.
///
/// Objects merge key by key, recursively. Any other patch value (including
/// arrays and `null`) replaces the target value wholesale.
pub fn merge_json(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match target_map.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => {
            *target = patch.clone();
        }
    }
}

/// Return `base` with `patch` merged over it.
pub fn merged(base: &Value, patch: &Value) -> Value {
    let mut out = base.clone();
    merge_json(&mut out, patch);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_are_merged_not_replaced() {
        let base = json!({"visual": {"text": {"size": 16, "color": "#fff"}}});
        let out = merged(&base, &json!({"visual": {"text": {"size": 24}}}));
        assert_eq!(out, json!({"visual": {"text": {"size": 24, "color": "#fff"}}}));
    }

    #[test]
    fn arrays_replace_wholesale() {
        let base = json!({"words": ["a", "b"]});
        let out = merged(&base, &json!({"words": ["c"]}));
        assert_eq!(out, json!({"words": ["c"]}));
    }

    #[test]
    fn object_patch_over_scalar_replaces() {
        let out = merged(&json!("flat"), &json!({"a": 1}));
        assert_eq!(out, json!({"a": 1}));
    }

    #[test]
    fn empty_patch_is_identity() {
        let base = json!({"a": {"b": 1}});
        assert_eq!(merged(&base, &json!({})), base);
    }
}
