//! Benchmarks for template compilation, path queries and mapping
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use futures::executor::block_on;
use serde_json::{json, Value};
use shapemap_core::query::JsonPath;
use shapemap_core::{Mapper, MiddlewareError, MiddlewareRegistry, Template};

fn create_people(count: usize) -> Value {
    let people: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": i,
                "name": {"givenName": format!("Given {}", i), "surname": format!("Surname {}", i % 17)},
                "tags": [format!("t{}", i % 3), format!("t{}", i % 5)],
                "active": i % 2 == 0
            })
        })
        .collect();
    json!({"org": {"people": people}})
}

fn create_template() -> Value {
    json!({
        "people": ["$.org.people", {
            "id": "$.id",
            "surname": "$.name.surname",
            "active": "$.active",
            "$.name.givenName": "$.id"
        }],
        "tags": {"$unique": ["$..tags[*]"]},
        "first": {"$getFirstElement": "$.org.people"},
        "kind": "directory"
    })
}

fn bench_compile(c: &mut Criterion) {
    let registry = MiddlewareRegistry::with_defaults();
    let template = create_template();
    c.bench_function("compile_template", |b| {
        b.iter(|| Template::compile(black_box(&template), Some(&registry), &Default::default()).unwrap())
    });
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let data = create_people(200);

    let queries = vec![
        ("simple", "$.org"),
        ("nested", "$.org.people[0].name.givenName"),
        ("wildcard", "$.org.people[*].id"),
        ("slice", "$.org.people[10:50:2].id"),
        ("recursive", "$..givenName"),
    ];

    for (name, expr) in queries {
        let path = JsonPath::parse(expr).unwrap();
        group.bench_with_input(BenchmarkId::new("execute", name), &path, |b, path| {
            b.iter(|| path.execute(black_box(&data)).unwrap())
        });
    }
    group.finish();
}

fn bench_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("map");
    let mapper = Mapper::with_middleware(create_template(), MiddlewareRegistry::with_defaults()).unwrap();

    for size in [10, 100, 1000] {
        let source = create_people(size);
        group.bench_with_input(BenchmarkId::new("sync", size), &source, |b, source| {
            b.iter(|| mapper.map(std::slice::from_ref(black_box(source))).unwrap())
        });
    }

    let sources: Vec<Value> = (0..4).map(|_| create_people(100)).collect();
    group.bench_function("merge_four_sources", |b| {
        b.iter(|| mapper.map(black_box(&sources)).unwrap())
    });
    group.finish();
}

fn bench_deferred(c: &mut Criterion) {
    let registry = MiddlewareRegistry::with_defaults()
        .register_async("$later", |value, _| async move { Ok::<_, MiddlewareError>(value) });
    let mapper = Mapper::with_middleware(json!({"ids": ["$.org.people", {"$later": "$.id"}]}), registry).unwrap();
    let source = create_people(100);

    c.bench_function("map_deferred_100", |b| {
        b.iter(|| block_on(mapper.map_async(std::slice::from_ref(black_box(&source)))).unwrap())
    });
}

criterion_group!(benches, bench_compile, bench_queries, bench_map, bench_deferred);
criterion_main!(benches);
