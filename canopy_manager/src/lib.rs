// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Manager: viewport and zoom driven visibility for map overlays.
//!
//! A map with thousands of markers cannot afford to render all of them. [`Manager`] tracks
//! overlays and, on every pass, shows only those whose position lies inside the current
//! (padded) viewport and whose zoom range contains the current zoom.
//!
//! - The map is abstracted by [`MapHost`]: zoom, visible bounds, pixel projection, and a
//!   render tree to attach nodes to.
//! - Overlays implement [`Overlay`]: a position, `show`/`hide`, and [`OverlayAttrs`].
//! - Overlays are attached lazily the first time they come into view and are only hidden,
//!   never detached, when they leave it.
//! - View changes are coalesced: [`Manager::notify`] schedules a trailing-edge pass and
//!   [`Manager::poll`] runs it once the host has been quiet for the debounce period.
//!
//! [`HeadlessMap`] is an in-memory host with a linear projection.
//!
//! # Example
//!
//! ```rust
//! use canopy_manager::{AddOptions, HeadlessMap, Manager, Overlay, OverlayAttrs};
//! use kurbo::{Point, Size};
//!
//! struct Dot {
//!     id: u32,
//!     at: Point,
//!     attrs: OverlayAttrs,
//! }
//!
//! impl Overlay for Dot {
//!     type Node = u32;
//!     fn node(&self) -> u32 { self.id }
//!     fn position(&self) -> Point { self.at }
//!     fn show(&mut self) {}
//!     fn hide(&mut self) {}
//!     fn attrs(&self) -> &OverlayAttrs { &self.attrs }
//!     fn attrs_mut(&mut self) -> &mut OverlayAttrs { &mut self.attrs }
//! }
//!
//! let host = HeadlessMap::new(Size::new(800.0, 600.0), Point::new(118.8, 32.0), 10);
//! let mut manager = Manager::new(host);
//!
//! let near = Dot { id: 1, at: Point::new(118.81, 32.01), attrs: OverlayAttrs::new() };
//! let far = Dot { id: 2, at: Point::new(120.0, 30.0), attrs: OverlayAttrs::new() };
//! let ids = manager.add_overlays([near, far], AddOptions::default()).unwrap();
//!
//! assert_eq!(manager.visible_overlays().collect::<Vec<_>>(), vec![ids[0]]);
//! assert_eq!(manager.host().attached(), &[1]);
//! ```

mod error;
mod headless;
mod host;
mod manager;
mod schedule;
mod types;

pub use error::ManagerError;
pub use headless::{HeadlessMap, MAX_ZOOM, TILE_SIZE};
pub use host::{MapHost, Overlay};
pub use manager::{Manager, ManagerOptions, OverlayFilter};
pub use schedule::Debouncer;
pub use types::{
    AddOptions, GeoBounds, OverlayAttrs, OverlayId, OverlayState, PassStats, ViewChange,
};
