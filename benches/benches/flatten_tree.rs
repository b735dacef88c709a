// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_records::{FlattenOptions, Flattener, ZoomRange};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// A region tree `fanout` wide and `depth` deep with random leaf coordinates.
fn gen_tree(fanout: usize, depth: usize, rng: &mut Rng, next_id: &mut u64) -> Vec<Value> {
    (0..fanout)
        .map(|_| {
            *next_id += 1;
            let id = *next_id;
            if depth == 0 {
                json!({
                    "id": id,
                    "name": format!("site {id}"),
                    "x": 118.0 + rng.next_f64(),
                    "y": 31.5 + rng.next_f64(),
                })
            } else {
                json!({
                    "id": id,
                    "name": format!("region {id}"),
                    "children": gen_tree(fanout, depth - 1, rng, next_id),
                })
            }
        })
        .collect()
}

fn options() -> FlattenOptions {
    FlattenOptions::default().with_zoom_levels([
        ("lv0", ZoomRange::new(6, 8)),
        ("lv1", ZoomRange::new(9, 11)),
        ("lv2", ZoomRange::new(12, 14)),
        ("lv3", ZoomRange::new(15, 18)),
    ])
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");
    for &fanout in &[4usize, 8, 12] {
        let mut rng = Rng::new(0x5eed_0001);
        let mut next_id = 0;
        let source = Value::Array(gen_tree(fanout, 3, &mut rng, &mut next_id));
        group.throughput(Throughput::Elements(next_id));
        group.bench_function(format!("tree_fanout{fanout}_depth4"), |b| {
            b.iter_batched(
                || source.clone(),
                |source| {
                    let mut flattener = Flattener::new(options()).unwrap();
                    let n = flattener.flatten(source).unwrap().len();
                    black_box(n);
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let mut rng = Rng::new(0x5eed_0002);
    let mut next_id = 0;
    let mut flattener = Flattener::new(options()).unwrap();
    flattener
        .flatten(Value::Array(gen_tree(8, 3, &mut rng, &mut next_id)))
        .unwrap();
    group.bench_function("find_by_id_loose", |b| {
        b.iter(|| black_box(flattener.find_by_id(black_box("2048")).len()))
    });
    group.bench_function("find_where_level", |b| {
        b.iter(|| black_box(flattener.find_where(|r| r.level == 2).len()))
    });
    group.finish();
}

criterion_group!(benches, bench_flatten, bench_queries);
criterion_main!(benches);
