//! Built-in middleware functions
//!
//! Pair-taking functions (`$override`, `$intersection`, `$union`) read an
//! object operand with `x` and `y` members; membership tests (`$some`,
//! `$every`) read `x` (the needle) and `arr` (the haystack).
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use super::{MiddlewareError, MiddlewareRegistry};
use serde_json::{Map, Value};

type BuiltIn = fn(Value, bool) -> Result<Value, MiddlewareError>;

/// Every built-in, by registered name
pub const DEFAULTS: &[(&str, BuiltIn)] = &[
    ("$getFirstElement", get_first_element),
    ("$identity", identity),
    ("$mergeObjects", merge_objects),
    ("$override", override_value),
    ("$unique", unique),
    ("$intersection", intersection),
    ("$union", union),
    ("$some", some),
    ("$every", every),
];

/// Add every built-in to `registry`
pub fn register_defaults(registry: MiddlewareRegistry) -> MiddlewareRegistry {
    DEFAULTS
        .iter()
        .fold(registry, |registry, (name, function)| registry.register(*name, *function))
}

/// First element of an array, `null` when empty
pub fn get_first_element(value: Value, _literal: bool) -> Result<Value, MiddlewareError> {
    let items = expect_array(value, "$getFirstElement")?;
    Ok(items.into_iter().next().unwrap_or(Value::Null))
}

pub fn identity(value: Value, _literal: bool) -> Result<Value, MiddlewareError> {
    Ok(value)
}

/// Shallow merge of an array of objects; later members win
pub fn merge_objects(value: Value, _literal: bool) -> Result<Value, MiddlewareError> {
    let items = expect_array(value, "$mergeObjects")?;
    let mut merged = Map::new();
    for item in items {
        match item {
            Value::Object(fields) => merged.extend(fields),
            Value::Null => {}
            other => {
                return Err(MiddlewareError::invalid_operand(format!(
                    "$mergeObjects expects an array of objects, found {}",
                    type_name(&other)
                )))
            }
        }
    }
    Ok(Value::Object(merged))
}

/// `y` when present, otherwise `x`
pub fn override_value(value: Value, _literal: bool) -> Result<Value, MiddlewareError> {
    let (x, y) = expect_pair(value, "$override", "y")?;
    Ok(if y.is_null() { x } else { y })
}

/// Array with duplicates removed, first occurrence kept
pub fn unique(value: Value, _literal: bool) -> Result<Value, MiddlewareError> {
    let items = expect_array(value, "$unique")?;
    Ok(Value::Array(dedup(items)))
}

/// Members of `x` also present in `y`, in `x` order
pub fn intersection(value: Value, _literal: bool) -> Result<Value, MiddlewareError> {
    let (x, y) = expect_pair(value, "$intersection", "y")?;
    let x = expect_array(x, "$intersection")?;
    let y = expect_array(y, "$intersection")?;
    let common = x.into_iter().filter(|item| y.contains(item)).collect();
    Ok(Value::Array(dedup(common)))
}

/// Members of `x` then members of `y`, without duplicates
pub fn union(value: Value, _literal: bool) -> Result<Value, MiddlewareError> {
    let (x, y) = expect_pair(value, "$union", "y")?;
    let mut combined = expect_array(x, "$union")?;
    combined.extend(expect_array(y, "$union")?);
    Ok(Value::Array(dedup(combined)))
}

/// True when any member of `arr` equals `x`
pub fn some(value: Value, _literal: bool) -> Result<Value, MiddlewareError> {
    let (x, arr) = expect_pair(value, "$some", "arr")?;
    let arr = expect_array(arr, "$some")?;
    Ok(Value::Bool(arr.iter().any(|item| *item == x)))
}

/// True when every member of `arr` equals `x`
pub fn every(value: Value, _literal: bool) -> Result<Value, MiddlewareError> {
    let (x, arr) = expect_pair(value, "$every", "arr")?;
    let arr = expect_array(arr, "$every")?;
    Ok(Value::Bool(arr.iter().all(|item| *item == x)))
}

fn dedup(items: Vec<Value>) -> Vec<Value> {
    let mut seen: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

fn expect_array(value: Value, function: &str) -> Result<Vec<Value>, MiddlewareError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(MiddlewareError::invalid_operand(format!(
            "{} expects an array, found {}",
            function,
            type_name(&other)
        ))),
    }
}

/// Split an `{x, <second>}` operand; missing members read as `null`
fn expect_pair(value: Value, function: &str, second: &str) -> Result<(Value, Value), MiddlewareError> {
    match value {
        Value::Object(mut fields) => {
            let x = fields.remove("x").unwrap_or(Value::Null);
            let y = fields.remove(second).unwrap_or(Value::Null);
            Ok((x, y))
        }
        other => Err(MiddlewareError::invalid_operand(format!(
            "{} expects an object with 'x' and '{}', found {}",
            function,
            second,
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
