// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drive a marker manager through zoom and pan gestures on a headless map.
//!
//! View changes are coalesced: a burst of drag-end events produces a single pass once the
//! map has been quiet for the debounce period.
//!
//! Run:
//! - `RUST_LOG=canopy_manager=trace cargo run -p canopy_demos --example viewport_culling`

use std::time::{Duration, Instant};

use canopy_manager::{AddOptions, HeadlessMap, Manager, MapHost, ManagerOptions, ViewChange};
use canopy_marker::{Marker, MarkerKey};
use canopy_records::{FlattenOptions, Flattener, ZoomRange};
use kurbo::{Point, Size, Vec2};
use serde_json::{Value, json};

fn dataset() -> Value {
    let depots: Vec<Value> = (0..6)
        .map(|d| {
            let pumps: Vec<Value> = (0..8)
                .map(|p| {
                    json!({
                        "id": 1000 + d * 10 + p,
                        "name": format!("pump {d}.{p}"),
                        "x": 118.6 + 0.1 * f64::from(d) + 0.004 * f64::from(p),
                        "y": 31.9 + 0.003 * f64::from(p),
                    })
                })
                .collect();
            json!({"id": 100 + d, "name": format!("depot {d}"), "children": pumps})
        })
        .collect();
    json!([{"id": 1, "name": "district", "children": depots}])
}

fn report(label: &str, manager: &Manager<HeadlessMap<MarkerKey>, Marker>) {
    let names: Vec<&str> = manager
        .visible_overlays()
        .filter_map(|id| manager.get(id))
        .map(|m| m.content().text.as_str())
        .collect();
    println!(
        "{label:<22} zoom {:>2}  {:>2} visible  {} attached  {:?}",
        manager.host().zoom(),
        names.len(),
        manager.host().attached().len(),
        names
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let options = FlattenOptions::default().with_zoom_levels([
        ("lv0", ZoomRange::new(6, 9)),
        ("lv1", ZoomRange::new(10, 12)),
        ("lv2", ZoomRange::new(13, 18)),
    ]);
    let mut flattener = Flattener::new(options)?;
    let markers = flattener
        .flatten(dataset())?
        .iter()
        .zip(0..)
        .map(|(record, key)| Marker::from_record(MarkerKey(key), record, None))
        .collect::<Result<Vec<_>, _>>()?;

    let host = HeadlessMap::new(Size::new(1024.0, 768.0), Point::new(118.85, 31.91), 8);
    let mut manager = Manager::with_options(
        host,
        ManagerOptions {
            padding: 64.0,
            ..ManagerOptions::default()
        },
    )?;
    manager.add_overlays(markers, AddOptions::default())?;
    report("initial", &manager);

    manager.center_and_zoom(Point::new(118.85, 31.91), Some(11));
    report("zoomed to depots", &manager);

    manager.center_and_zoom(Point::new(118.62, 31.91), Some(14));
    report("zoomed to pumps", &manager);

    // A drag gesture emits several drag-end events in quick succession.
    let mut now = Instant::now();
    for _ in 0..5 {
        manager.host_mut().pan_by(Vec2::new(120.0, 0.0));
        manager.notify(ViewChange::DragEnd, now);
        now += Duration::from_millis(30);
        let ran = manager.poll(now);
        println!("  drag tick, pass ran: {ran}");
    }
    now += manager.options().debounce;
    println!("  after quiet period, pass ran: {}", manager.poll(now));
    report("after panning", &manager);

    manager.hide(None);
    report("hidden", &manager);
    manager.show(Some(Box::new(|m: &Marker| m.content().text.ends_with(".0"))));
    report("filtered", &manager);

    let cleared = manager.clear_visible_overlays();
    println!("cleared {} visible markers, {} remain", cleared.len(), manager.len());
    Ok(())
}
