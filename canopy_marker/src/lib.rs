// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Marker: labelled map markers for the Canopy overlay manager.
//!
//! A [`Marker`] is an icon with an optional label and count badge, positioned at a
//! geographic point and offset by a pixel anchor. It implements
//! [`Overlay`](canopy_manager::Overlay), so it can be registered directly with a
//! [`Manager`](canopy_manager::Manager), and carries its own
//! [`Listeners`](canopy_events::Listeners) for click, hover, drag, load, and remove events.
//!
//! [`MarkerCollection`] builds many markers at once, numbering them so a shared handler can
//! tell which one fired.
//!
//! ```rust
//! use canopy_events::EventKind;
//! use canopy_manager::{AddOptions, HeadlessMap, Manager};
//! use canopy_marker::{MarkerCollection, MarkerContent, MarkerOptions};
//! use kurbo::{Point, Size};
//!
//! let mut sites = MarkerCollection::new([
//!     MarkerOptions::new(Point::new(118.80, 32.00), MarkerContent::text("Depot")),
//!     MarkerOptions::new(Point::new(118.81, 32.01), MarkerContent::text("Pump").with_count(4)),
//! ])
//! .unwrap();
//! sites.on(EventKind::Click, |e| println!("clicked marker #{:?}", e.payload.index));
//!
//! let host = HeadlessMap::new(Size::new(800.0, 600.0), Point::new(118.8, 32.0), 12);
//! let mut manager = Manager::new(host);
//! manager
//!     .add_overlays(sites.into_markers(), AddOptions::default())
//!     .unwrap();
//! assert_eq!(manager.visible_overlays().count(), 2);
//! ```

mod collection;
mod error;
mod marker;
mod options;

pub use collection::MarkerCollection;
pub use error::MarkerError;
pub use marker::{Marker, MarkerEvent, MarkerKey};
pub use options::{Icon, MarkerContent, MarkerOptions};
