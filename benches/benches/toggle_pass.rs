// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_manager::{AddOptions, HeadlessMap, Manager, Overlay, OverlayAttrs};
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Size, Vec2};

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

struct Dot {
    id: u32,
    at: Point,
    attrs: OverlayAttrs,
}

impl Overlay for Dot {
    type Node = u32;
    fn node(&self) -> u32 {
        self.id
    }
    fn position(&self) -> Point {
        self.at
    }
    fn show(&mut self) {}
    fn hide(&mut self) {}
    fn attrs(&self) -> &OverlayAttrs {
        &self.attrs
    }
    fn attrs_mut(&mut self) -> &mut OverlayAttrs {
        &mut self.attrs
    }
}

/// `count` dots scattered over a 2x2 degree area around the view center.
fn gen_manager(count: u32, seed: u64) -> Manager<HeadlessMap<u32>, Dot> {
    let mut rng = Rng::new(seed);
    let host = HeadlessMap::new(Size::new(1280.0, 800.0), Point::new(119.0, 32.0), 11);
    let mut manager = Manager::new(host);
    let dots = (0..count).map(|id| Dot {
        id,
        at: Point::new(118.0 + 2.0 * rng.next_f64(), 31.0 + 2.0 * rng.next_f64()),
        attrs: OverlayAttrs::new(),
    });
    manager.add_overlays(dots, AddOptions::default()).unwrap();
    manager
}

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("toggle_pass");
    for &count in &[1_000u32, 10_000, 50_000] {
        let mut manager = gen_manager(count, 0x5eed_1000 + u64::from(count));
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_function(format!("steady_n{count}"), |b| {
            b.iter(|| black_box(manager.refresh()))
        });
        group.bench_function(format!("pan_n{count}"), |b| {
            let mut step = 0_i32;
            b.iter(|| {
                step += 1;
                let dx = if step % 2 == 0 { 400.0 } else { -400.0 };
                manager.host_mut().pan_by(Vec2::new(dx, 0.0));
                black_box(manager.refresh())
            })
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("manager_queries");
    let manager = gen_manager(10_000, 0x5eed_2000);
    group.bench_function("visible_overlays_n10000", |b| {
        b.iter(|| black_box(manager.visible_overlays().count()))
    });
    group.bench_function("find_by_key_maxzoom", |b| {
        b.iter(|| black_box(manager.find_by_key(black_box(16), "maxZoom")))
    });
    group.finish();
}

criterion_group!(benches, bench_refresh, bench_queries);
criterion_main!(benches);
