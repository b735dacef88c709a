// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marker listeners: shared click handlers, dragging, and load/remove notifications.
//!
//! Run:
//! - `cargo run -p canopy_demos --example marker_events`

use std::cell::RefCell;
use std::rc::Rc;

use canopy_events::EventKind;
use canopy_manager::{AddOptions, HeadlessMap, Manager, MapHost};
use canopy_marker::{Icon, MarkerCollection, MarkerContent, MarkerOptions};
use kurbo::{Point, Size, Vec2};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let pin = Icon::new("pin.png", Size::new(24.0, 32.0));
    let options = ["Depot", "Pump", "Valve"].iter().enumerate().map(|(i, name)| {
        let mut opts = MarkerOptions::new(
            Point::new(118.80 + 0.01 * i as f64, 32.0),
            MarkerContent::icon(pin.clone(), *name).with_count(i + 1),
        );
        opts.anchor = Vec2::new(-12.0, -32.0);
        opts.draggable = i == 1;
        opts
    });
    let mut markers = MarkerCollection::new(options)?;

    let journal = Rc::new(RefCell::new(Vec::<String>::new()));
    for kind in [EventKind::Load, EventKind::Click, EventKind::DragEnd, EventKind::Remove] {
        let journal = journal.clone();
        markers.on(kind, move |e| {
            journal
                .borrow_mut()
                .push(format!("{} on #{:?} at {:?}", e.kind, e.payload.index, e.payload.position));
        });
    }
    // Vetoing clicks on the first marker.
    markers.markers_mut()[0].on_named(EventKind::Click, "veto", |e| e.prevent_default())?;

    for marker in markers.markers_mut() {
        let accepted = marker.emit(EventKind::Click);
        println!("click on {:<6} accepted: {accepted}", marker.content().text);
    }

    let pump = &mut markers.markers_mut()[1];
    if pump.begin_drag() {
        pump.drag_to(Point::new(118.815, 32.004))?;
        pump.end_drag();
    }

    let host = HeadlessMap::new(Size::new(800.0, 600.0), Point::new(118.81, 32.0), 12);
    let mut manager = Manager::new(host);
    let ids = manager.add_overlays(markers.into_markers(), AddOptions::default())?;
    if let Some(marker) = manager.get(ids[2]) {
        let pixel = manager.host().point_to_pixel(marker.position());
        println!("valve drawn at {:?}", marker.origin_at(pixel));
    }
    manager.remove_overlays(ids);

    for line in journal.borrow().iter() {
        println!("{line}");
    }
    Ok(())
}
