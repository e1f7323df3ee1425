//! Built-in middleware used through the mapper

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shapemap_core::{Mapper, MiddlewareRegistry};

fn map_with_defaults(template: Value, source: Value) -> Value {
    Mapper::with_middleware(template, MiddlewareRegistry::with_defaults())
        .expect("template should compile")
        .map(&[source])
        .expect("mapping should succeed")
        .ready()
        .expect("built-ins never defer")
}

fn fruit_baskets() -> Value {
    json!({
        "daisy": ["apple", "pineapple", "plumb", "orange", "pizza", "grapes"],
        "paul": ["kiwi", "orange", "apricot", "apple", "banana", "pizza"]
    })
}

fn test_runs(last: &str) -> Value {
    json!({
        "processed": [
            {"item": 1, "duration": 19.2, "passed": "passed"},
            {"item": 2, "duration": 31, "passed": "passed"},
            {"item": 3, "duration": 104, "passed": last},
            {"item": 4, "duration": 12, "passed": "passed"}
        ]
    })
}

#[test]
fn test_defaults_combined_with_custom_function() {
    let registry = MiddlewareRegistry::with_defaults().register("$write5Ones", |_, _| Ok(json!(11111)));
    let mapper = Mapper::with_middleware(
        json!({
            "name": {"$override": {"x": "$.bar", "y": "$.info.name"}},
            "type": {
                "complexInnerType": "$.innerType",
                "innerName": {"$write5Ones": null, "literal": true}
            }
        }),
        registry,
    )
    .unwrap();

    let result = mapper
        .map(&[json!({"bar": "ANAME", "innerType": true, "info": {"name": "Tony"}})])
        .unwrap()
        .ready();
    assert_eq!(
        result,
        Some(json!({"name": "Tony", "type": {"complexInnerType": true, "innerName": 11111}}))
    );
}

#[test]
fn test_override_falls_back_to_x() {
    let result = map_with_defaults(
        json!({"name": {"$override": {"x": "$.bar", "y": "$.info.name"}}}),
        json!({"bar": "ANAME"}),
    );
    assert_eq!(result, json!({"name": "ANAME"}));
}

#[test]
fn test_get_first_element() {
    let result = map_with_defaults(
        json!({"firstValue": {"$getFirstElement": "$..allValues"}}),
        json!({"foo": {"data": {"allValues": [100, 2, 12, 3]}}}),
    );
    assert_eq!(result, json!({"firstValue": 100}));
}

#[test]
fn test_merge_objects() {
    let result = map_with_defaults(
        json!({"mergedObjects": {"$mergeObjects": "$.foo"}}),
        json!({"foo": [{"value": "cheese"}, {"number": 1}, {"deeper": {"hello": "world"}}]}),
    );
    assert_eq!(
        result,
        json!({"mergedObjects": {"value": "cheese", "number": 1, "deeper": {"hello": "world"}}})
    );
}

#[test]
fn test_unique() {
    let result = map_with_defaults(
        json!({"onlyOne": {"$unique": "$.foo"}}),
        json!({"foo": [1, 1, 2, 4, 4, 4, 4, 4, 5, 7, 8, 8]}),
    );
    assert_eq!(result, json!({"onlyOne": [1, 2, 4, 5, 7, 8]}));
}

#[test]
fn test_intersection() {
    let result = map_with_defaults(json!({"both": {"$intersection": {"x": "$.daisy", "y": "$.paul"}}}), fruit_baskets());
    assert_eq!(result, json!({"both": ["apple", "orange", "pizza"]}));
}

#[test]
fn test_union() {
    let result = map_with_defaults(json!({"combined": {"$union": {"x": "$.daisy", "y": "$.paul"}}}), fruit_baskets());
    assert_eq!(
        result,
        json!({"combined": ["apple", "pineapple", "plumb", "orange", "pizza", "grapes", "kiwi", "apricot", "banana"]})
    );
}

#[test]
fn test_some() {
    let result = map_with_defaults(
        json!({"valid": {"$some": {"x": "beans", "arr": "$.items"}}}),
        json!({"items": ["cheese", "chicken", "water", "beans"]}),
    );
    assert_eq!(result, json!({"valid": true}));
}

#[test]
fn test_every() {
    let template = json!({"totalSuccess": {"$every": {"x": "passed", "arr": ["$..passed"]}}});
    assert_eq!(
        map_with_defaults(template.clone(), test_runs("passed")),
        json!({"totalSuccess": true})
    );
    assert_eq!(
        map_with_defaults(template, test_runs("failed")),
        json!({"totalSuccess": false})
    );
}

#[test]
fn test_literal_operand_is_not_queried() {
    let result = map_with_defaults(
        json!({"raw": {"$identity": {"path": "$.never"}, "literal": true}}),
        json!({"never": "resolved"}),
    );
    assert_eq!(result, json!({"raw": {"path": "$.never"}}));
}
