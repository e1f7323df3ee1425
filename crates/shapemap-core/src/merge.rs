//! Deep merge of per-source results
//!
//! Arrays concatenate, objects merge key by key, and anything else takes the
//! right-hand value, `null` included.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use serde_json::Value;

/// Merge `right` into `left`
pub fn merge(left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Array(mut left), Value::Array(right)) => {
            left.extend(right);
            Value::Array(left)
        }
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                match left.get_mut(&key) {
                    Some(existing) => {
                        let current = std::mem::take(existing);
                        *existing = merge(current, value);
                    }
                    None => {
                        left.insert(key, value);
                    }
                }
            }
            Value::Object(left)
        }
        (_, right) => right,
    }
}

/// Fold `results` left to right; `null` when there is nothing to merge
pub fn merge_all<I>(results: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    results.into_iter().reduce(merge).unwrap_or(Value::Null)
}
