//! Deferred middleware results under a tokio runtime

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shapemap_core::{Error, Mapper, Mapping, MiddlewareError, MiddlewareOutput, MiddlewareRegistry, MiddlewareResult};
use std::time::Duration;

fn slow_registry() -> MiddlewareRegistry {
    MiddlewareRegistry::with_defaults()
        .register_async("$write5Ones", |_, _| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, MiddlewareError>(json!(11111))
        })
        .register_async("$slowUpper", |value: Value, _| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            value
                .as_str()
                .map(|s| json!(s.to_uppercase()))
                .ok_or_else(|| MiddlewareError::invalid_operand("expected a string"))
        })
}

fn override_template() -> Value {
    json!({
        "name": {"$override": {"x": "$.bar", "y": "$.info.name"}},
        "type": {
            "complexInnerType": "$.innerType",
            "innerName": {"$write5Ones": null, "literal": true}
        }
    })
}

#[tokio::test]
async fn test_async_middleware_settles_before_merge() {
    let mapper = Mapper::with_middleware(override_template(), slow_registry()).unwrap();
    let source = json!({"bar": "ANAME", "innerType": true, "info": {"name": "Tony"}});

    let mapping = mapper.map(&[source]).unwrap();
    assert!(mapping.is_deferred());

    let result = mapping.await.unwrap();
    assert_eq!(
        result,
        json!({"name": "Tony", "type": {"complexInnerType": true, "innerName": 11111}})
    );
}

#[tokio::test]
async fn test_deferred_values_across_sources() {
    let mapper = Mapper::with_middleware(json!({"names": [{"$slowUpper": "$.name"}]}), slow_registry()).unwrap();
    let result = mapper
        .map_async(&[json!({"name": "fred"}), json!({"name": "wilma"}), json!({"name": "barney"})])
        .await
        .unwrap();
    assert_eq!(result, json!({"names": ["FRED", "WILMA", "BARNEY"]}));
}

#[tokio::test]
async fn test_deferred_scalar_right_wins() {
    let mapper = Mapper::with_middleware(json!({"name": {"$slowUpper": "$.name"}}), slow_registry()).unwrap();
    let result = mapper
        .map_async(&[json!({"name": "aname"}), json!({"name": "bname"})])
        .await
        .unwrap();
    assert_eq!(result, json!({"name": "BNAME"}));
}

#[tokio::test]
async fn test_sync_function_over_deferred_operand() {
    let mapper = Mapper::with_middleware(
        json!({"first": {"$getFirstElement": [{"$slowUpper": "$.a"}, {"$slowUpper": "$.b"}]}}),
        slow_registry(),
    )
    .unwrap();
    let result = mapper.map_async(&[json!({"a": "x", "b": "y"})]).await.unwrap();
    assert_eq!(result, json!({"first": "X"}));
}

#[tokio::test]
async fn test_deferred_failure_rejects_mapping() {
    let mapper = Mapper::with_middleware(json!({"name": {"$slowUpper": "$.missing"}}), slow_registry()).unwrap();
    let err = mapper.map_async(&[json!({})]).await.unwrap_err();
    match err {
        Error::MiddlewareExecution { key, function, .. } => {
            assert_eq!(key, "name");
            assert_eq!(function, "$slowUpper");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_function_choosing_to_defer_per_call() {
    let registry = MiddlewareRegistry::new().register_middleware("$maybeLater", |value: Value, _literal: bool| -> MiddlewareResult {
        if value.is_number() {
            Ok(MiddlewareOutput::Ready(value))
        } else {
            Ok(MiddlewareOutput::Deferred(Box::pin(async move { Ok::<_, MiddlewareError>(json!([value])) })))
        }
    });
    let mapper = Mapper::with_middleware(
        json!({"now": {"$maybeLater": "$.n"}, "later": {"$maybeLater": "$.s"}}),
        registry,
    )
    .unwrap();

    let mapping = mapper.map(&[json!({"n": 1, "s": "x"})]).unwrap();
    let Mapping::Deferred(deferred) = mapping else {
        panic!("expected a deferred mapping");
    };
    assert_eq!(deferred.pending_count(), 1);
    assert_eq!(deferred.await.unwrap(), json!({"now": 1, "later": ["x"]}));
}

#[tokio::test]
async fn test_concurrent_map_calls_share_mapper() {
    let mapper = std::sync::Arc::new(Mapper::with_middleware(json!({"v": {"$slowUpper": "$.v"}}), slow_registry()).unwrap());
    let handles: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|v| {
            let mapper = std::sync::Arc::clone(&mapper);
            tokio::spawn(async move { mapper.map_async(&[json!({"v": v})]).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }
    assert_eq!(results, vec![json!({"v": "A"}), json!({"v": "B"}), json!({"v": "C"})]);
}
