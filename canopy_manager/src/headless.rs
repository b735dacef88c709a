// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless [`MapHost`] with a linear projection, for tests, benchmarks, and demos.

use kurbo::{Affine, Point, Size, Vec2};

use crate::host::MapHost;
use crate::types::GeoBounds;

/// Pixels covering 360 degrees of longitude at zoom 0.
pub const TILE_SIZE: f64 = 256.0;

/// Highest zoom level the headless map accepts.
pub const MAX_ZOOM: u32 = 22;

/// An in-memory map view.
///
/// Longitude maps linearly to pixel `x` and latitude to pixel `y` (pointing down), with
/// `TILE_SIZE * 2^zoom / 360` pixels per degree. The render tree is a list of attached
/// node handles.
#[derive(Clone, Debug)]
pub struct HeadlessMap<N> {
    view: Size,
    center: Point,
    zoom: u32,
    attached: Vec<N>,
}

impl<N> HeadlessMap<N> {
    /// Create a view of `view` pixels centered on `center` at `zoom` (clamped to [`MAX_ZOOM`]).
    pub fn new(view: Size, center: Point, zoom: u32) -> Self {
        Self {
            view,
            center,
            zoom: zoom.min(MAX_ZOOM),
            attached: Vec::new(),
        }
    }

    /// Geographic center of the view.
    pub fn center(&self) -> Point {
        self.center
    }

    /// View size in pixels.
    pub fn view_size(&self) -> Size {
        self.view
    }

    /// Resize the view, keeping the center.
    pub fn set_view_size(&mut self, view: Size) {
        self.view = view;
    }

    /// Change the zoom, keeping the center.
    pub fn set_zoom(&mut self, zoom: u32) {
        self.zoom = zoom.min(MAX_ZOOM);
    }

    /// Pan the view by a pixel offset, as a drag would.
    pub fn pan_by(&mut self, delta: Vec2) {
        let scale = self.scale();
        self.center += Vec2::new(delta.x / scale, -delta.y / scale);
    }

    /// Nodes currently attached, in attach order.
    pub fn attached(&self) -> &[N] {
        &self.attached
    }

    /// Pixels per degree at the current zoom.
    pub fn scale(&self) -> f64 {
        #[allow(
            clippy::cast_possible_wrap,
            reason = "zoom is clamped to MAX_ZOOM."
        )]
        let zoom = self.zoom as i32;
        TILE_SIZE * 2_f64.powi(zoom) / 360.0
    }

    /// Geographic to pixel transform.
    pub fn world_to_view(&self) -> Affine {
        let scale = self.scale();
        Affine::translate(self.view.to_vec2() / 2.0)
            * Affine::scale_non_uniform(scale, -scale)
            * Affine::translate(-self.center.to_vec2())
    }
}

impl<N: PartialEq> HeadlessMap<N> {
    /// Whether `node` is attached.
    pub fn is_attached(&self, node: &N) -> bool {
        self.attached.contains(node)
    }
}

impl<N: Clone + PartialEq> MapHost<N> for HeadlessMap<N> {
    fn zoom(&self) -> u32 {
        self.zoom
    }

    fn visible_bounds(&self) -> GeoBounds {
        GeoBounds::new(
            self.pixel_to_point(Point::new(0.0, self.view.height)),
            self.pixel_to_point(Point::new(self.view.width, 0.0)),
        )
    }

    fn point_to_pixel(&self, point: Point) -> Point {
        self.world_to_view() * point
    }

    fn pixel_to_point(&self, pixel: Point) -> Point {
        self.world_to_view().inverse() * pixel
    }

    fn attach(&mut self, node: &N) {
        if !self.attached.contains(node) {
            self.attached.push(node.clone());
        }
    }

    fn detach(&mut self, node: &N) {
        self.attached.retain(|n| n != node);
    }

    fn set_center_and_zoom(&mut self, center: Point, zoom: u32) {
        self.center = center;
        self.set_zoom(zoom);
    }
}
