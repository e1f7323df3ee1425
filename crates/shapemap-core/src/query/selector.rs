//! Selector evaluation
//!
//! Each selector maps an ordered list of input nodes to an ordered list of
//! output nodes. Order is document order: object members in insertion order,
//! array elements by index.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use super::error::JsonPathError;
use crate::Result;
use serde_json::Value;

/// Applies one selector to a set of input nodes
pub trait SelectorExecutor {
    fn execute<'a>(&self, inputs: &[&'a Value], max_depth: usize) -> Result<Vec<&'a Value>>;
}

impl SelectorExecutor for Selector {
    fn execute<'a>(&self, inputs: &[&'a Value], max_depth: usize) -> Result<Vec<&'a Value>> {
        let mut results = Vec::new();

        match self {
            Selector::Child(child) => {
                for value in inputs {
                    if let Some(found) = value.as_object().and_then(|obj| obj.get(child.name())) {
                        results.push(found);
                    }
                }
            }
            Selector::Index(index) => {
                for value in inputs {
                    if let Some(array) = value.as_array() {
                        if let Some(idx) = resolve_index(*index, array.len()) {
                            results.push(&array[idx]);
                        }
                    }
                }
            }
            Selector::Slice(slice) => {
                for value in inputs {
                    if let Some(array) = value.as_array() {
                        for idx in slice_indices(slice, array.len()) {
                            results.push(&array[idx]);
                        }
                    }
                }
            }
            Selector::Wildcard => {
                for value in inputs {
                    push_children(value, &mut results);
                }
            }
            Selector::RecursiveDescent => {
                for value in inputs {
                    collect_descendants(value, 0, max_depth, &mut results)?;
                }
            }
            Selector::Union(selectors) => {
                // Each node is visited once per member, so `[0,0]` yields the element twice
                for value in inputs {
                    for selector in selectors {
                        results.extend(selector.execute(std::slice::from_ref(value), max_depth)?);
                    }
                }
            }
        }

        Ok(results)
    }
}

fn resolve_index(index: IndexSelector, len: usize) -> Option<usize> {
    match index {
        IndexSelector::Positive(idx) if idx < len => Some(idx),
        IndexSelector::Negative(idx) if idx > 0 && idx <= len => Some(len - idx),
        _ => None,
    }
}

/// Indices selected by a slice over an array of `len` elements
pub(crate) fn slice_indices(slice: &SliceSelector, len: usize) -> Vec<usize> {
    let len = len as i64;
    let normalize = |bound: i64| if bound < 0 { (len + bound).max(0) } else { bound.min(len) };
    let mut indices = Vec::new();

    if slice.step > 0 {
        let start = slice.start.map(normalize).unwrap_or(0);
        let end = slice.end.map(normalize).unwrap_or(len);
        let mut i = start;
        while i < end {
            indices.push(i as usize);
            i = match i.checked_add(slice.step) {
                Some(next) => next,
                None => break,
            };
        }
    } else {
        let start = slice
            .start
            .map(|s| if s < 0 { len + s } else { s.min(len - 1) })
            .unwrap_or(len - 1);
        let end = slice.end.map(|e| if e < 0 { len + e } else { e }).unwrap_or(-1);
        let mut i = start;
        while i > end && i >= 0 {
            indices.push(i as usize);
            i = match i.checked_add(slice.step) {
                Some(next) => next,
                None => break,
            };
        }
    }

    indices
}

fn push_children<'a>(value: &'a Value, results: &mut Vec<&'a Value>) {
    match value {
        Value::Object(obj) => results.extend(obj.values()),
        Value::Array(array) => results.extend(array.iter()),
        _ => {}
    }
}

/// The node itself followed by every descendant, depth first
fn collect_descendants<'a>(
    value: &'a Value,
    depth: usize,
    max_depth: usize,
    results: &mut Vec<&'a Value>,
) -> Result<()> {
    if depth > max_depth {
        return Err(JsonPathError::execution(
            format!("Maximum recursion depth of {} exceeded", max_depth),
            "..",
        )
        .into());
    }

    results.push(value);
    match value {
        Value::Object(obj) => {
            for child in obj.values() {
                collect_descendants(child, depth + 1, max_depth, results)?;
            }
        }
        Value::Array(array) => {
            for child in array {
                collect_descendants(child, depth + 1, max_depth, results)?;
            }
        }
        _ => {}
    }
    Ok(())
}
