//! Deep merge of configuration trees.
//!
//! Objects merge key-wise and recursively, arrays concatenate (base first),
//! anything else takes the overlay's value. Inputs are never mutated.

use serde_json::{Map, Value};

/// Merges `overlay` on top of `base`, returning a new value.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => Value::Object(merge_objects(base, overlay)),
        (Value::Array(base), Value::Array(overlay)) => {
            Value::Array(base.iter().chain(overlay).cloned().collect())
        }
        (_, overlay) => overlay.clone(),
    }
}

fn merge_objects(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let next = match base.get(key) {
            Some(existing) => deep_merge(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

/// Folds several overlays onto `base`, left to right.
pub fn merge_all<'a>(base: &Value, overlays: impl IntoIterator<Item = &'a Value>) -> Value {
    overlays
        .into_iter()
        .fold(base.clone(), |acc, overlay| deep_merge(&acc, overlay))
}
