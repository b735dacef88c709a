// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seams between the manager, the map host, and overlay implementations.

use kurbo::Point;

use crate::types::{GeoBounds, OverlayAttrs};

/// The map the manager culls against.
///
/// A host exposes its current view (zoom and visible bounds), converts between geographic
/// points and pixels, and owns a render tree that overlay nodes are attached to. Hosts do not
/// call back into the manager: the embedding event loop forwards view changes through
/// [`Manager::notify`](crate::Manager::notify).
///
/// `N` is the host's handle for a rendered overlay node.
pub trait MapHost<N> {
    /// Current integer zoom level.
    fn zoom(&self) -> u32;

    /// Geographic bounds of the current view.
    fn visible_bounds(&self) -> GeoBounds;

    /// Project a geographic point to a pixel position in the view.
    ///
    /// Pixel `y` grows downward.
    fn point_to_pixel(&self, point: Point) -> Point;

    /// Inverse of [`MapHost::point_to_pixel`].
    fn pixel_to_point(&self, pixel: Point) -> Point;

    /// Attach a node to the render tree.
    fn attach(&mut self, node: &N);

    /// Detach a node from the render tree. Detaching an unknown node is a no-op.
    fn detach(&mut self, node: &N);

    /// Move the view.
    fn set_center_and_zoom(&mut self, center: Point, zoom: u32);
}

/// A displayable overlay managed by a [`Manager`](crate::Manager).
pub trait Overlay {
    /// Host node handle for this overlay.
    type Node;

    /// The node to attach to or detach from the host.
    fn node(&self) -> Self::Node;

    /// Geographic position used for viewport tests.
    fn position(&self) -> Point;

    /// Display the overlay.
    fn show(&mut self);

    /// Stop displaying the overlay without detaching it.
    fn hide(&mut self);

    /// Manager attributes.
    fn attrs(&self) -> &OverlayAttrs;

    /// Mutable manager attributes.
    fn attrs_mut(&mut self) -> &mut OverlayAttrs;

    /// Called right after the node was attached to the host.
    fn on_attach(&mut self) {}

    /// Called right after the node was detached from the host.
    fn on_detach(&mut self) {}
}
