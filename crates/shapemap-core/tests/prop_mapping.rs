//! Property-based tests for the mapper
//!
//! These tests check invariants that should hold for any template and
//! source of the generated shapes.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use shapemap_core::Mapper;

/// Strategy for marker-free scalars
fn literal_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-zA-Z0-9 _.-]{0,16}".prop_map(Value::String),
    ]
}

/// Strategy for templates built only from literals
fn literal_template_strategy() -> impl Strategy<Value = Value> {
    literal_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(|mut items| {
                // a leading string would make the list a sub-template list
                items.insert(0, json!(0));
                Value::Array(items)
            }),
            prop::collection::btree_map("[a-z]{1,6}", inner, 1..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

/// Strategy for source documents with a `value` scalar and an `items` array
fn source_strategy() -> impl Strategy<Value = Value> {
    (literal_strategy(), prop::collection::vec(literal_strategy(), 0..5))
        .prop_map(|(value, items)| json!({"value": value, "items": items}))
}

proptest! {
    #[test]
    fn prop_literal_template_is_identity(template in literal_template_strategy(), source in source_strategy()) {
        let mapper = Mapper::new(template.clone()).unwrap();
        let result = mapper.map(&[source]).unwrap().ready();
        prop_assert_eq!(result, Some(template));
    }

    #[test]
    fn prop_arrays_concatenate_in_source_order(sources in prop::collection::vec(source_strategy(), 1..5)) {
        let mapper = Mapper::new(json!({"items": "$.items"})).unwrap();
        let result = mapper.map(&sources).unwrap().ready().unwrap();

        let expected: Vec<Value> = sources
            .iter()
            .flat_map(|source| source["items"].as_array().cloned().unwrap_or_default())
            .collect();
        prop_assert_eq!(&result["items"], &Value::Array(expected));
    }

    #[test]
    fn prop_scalars_right_wins(sources in prop::collection::vec(source_strategy(), 1..5)) {
        let mapper = Mapper::new(json!({"value": "$.value"})).unwrap();
        let result = mapper.map(&sources).unwrap().ready().unwrap();
        let last = &sources[sources.len() - 1]["value"];
        prop_assert_eq!(&result["value"], last);
    }

    #[test]
    fn prop_mapping_is_idempotent(source in source_strategy()) {
        let mapper = Mapper::new(json!({
            "value": "$.value",
            "items": ["$.items[*]"],
            "fixed": "constant",
            "missing": "$.nothing"
        }))
        .unwrap();
        let first = mapper.map(std::slice::from_ref(&source)).unwrap().ready();
        let second = mapper.map(std::slice::from_ref(&source)).unwrap().ready();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_iterative_lists_preserve_order(left in prop::collection::vec(any::<i32>(), 0..5), right in prop::collection::vec(any::<i32>(), 0..5)) {
        let mapper = Mapper::new(json!({"all": ["$.left[*]", "$.n", "$.right[*]", "$.n"]})).unwrap();
        let wrap = |values: &[i32]| values.iter().map(|n| json!({"n": n})).collect::<Vec<_>>();
        let source = json!({"left": wrap(&left), "right": wrap(&right)});

        let result = mapper.map(&[source]).unwrap().ready().unwrap();
        let expected: Vec<Value> = left.iter().chain(right.iter()).map(|n| json!(n)).collect();
        prop_assert_eq!(&result["all"], &Value::Array(expected));
    }
}
