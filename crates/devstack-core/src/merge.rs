//! Right-biased deep merge over YAML values.

use serde_yaml::Value;

/// Deep-merge `overlay` into `base`.
///
/// Recurses only when both sides are mappings. Everything else (scalars,
/// sequences, type-mismatched pairs) is replaced outright by the overlay
/// value; sequences are never merged element-wise.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
