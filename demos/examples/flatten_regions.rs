// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flatten an organisation tree into zoom-bucketed point records.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p canopy_demos --example flatten_regions`

use canopy_records::{FlattenOptions, Flattener, ZoomRange};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let levels: std::collections::BTreeMap<String, ZoomRange> = serde_json::from_value(json!({
        "lv0": {"minZoom": 6, "maxZoom": 9},
        "lv1": {"minZoom": 10, "maxZoom": 12},
        "lv2": {"minZoom": 13, "maxZoom": 18}
    }))?;
    let options = FlattenOptions {
        zoom_by_level: levels,
        ..FlattenOptions::default()
    }
    .with_convert(|record, source| {
        if let Some(kind) = source.get("kind") {
            record.attrs.insert("kind".into(), kind.clone());
        }
    });
    let mut flattener = Flattener::new(options)?;

    let source = json!([
        {
            "id": 1, "pid": 0, "name": "Jiangning",
            "children": [
                {"id": 11, "pid": 1, "name": "North depot", "x": "118.84", "y": "31.95",
                 "children": [
                     {"id": 111, "pid": 11, "name": "Pump A", "x": 118.841, "y": 31.952, "kind": "pump"},
                     {"id": 112, "pid": 11, "name": "Pump B", "x": 118.845, "y": 31.949, "kind": "pump"}
                 ]},
                {"id": 12, "pid": 1, "name": "South depot", "x": 118.80, "y": 31.80},
                {"id": "800011234", "pid": 1, "name": "Watched valve", "x": 118.7, "y": 31.7}
            ]
        },
        {"id": 1234, "pid": 0, "name": "Valve 1234", "x": 118.9, "y": 32.1, "kind": "valve"}
    ]);

    for record in flattener.flatten(source)? {
        println!(
            "{:>5} lv{} {:<14} ({:.4}, {:.4}) zoom {:?} count {:?}{}",
            record.id.to_string(),
            record.level,
            record.name,
            record.x,
            record.y,
            record.zoom().map(|z| z.min..=z.max),
            record.count,
            if record.is_attention { " [watched]" } else { "" },
        );
    }
    println!("deepest level: {}", flattener.max_level());
    println!("pumps: {}", flattener.find_by_key("pump", "kind").len());
    if let Some(depot) = flattener.find_first_by_key("11", "id") {
        println!("{}", serde_json::to_string_pretty(depot)?);
    }
    Ok(())
}
