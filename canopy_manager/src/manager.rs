// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core manager implementation: registration, the toggle pass, and queries.

use std::time::{Duration, Instant};

use kurbo::Point;
use serde_json::Value;

use crate::error::ManagerError;
use crate::host::{MapHost, Overlay};
use crate::schedule::Debouncer;
use crate::types::{AddOptions, GeoBounds, OverlayId, OverlayState, PassStats, ViewChange};

/// Predicate selecting overlays for a toggle pass or a query.
pub type OverlayFilter<O> = Box<dyn Fn(&O) -> bool>;

/// Manager configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManagerOptions {
    /// Margin in pixels added around the visible bounds.
    pub padding: f64,
    /// Lower zoom bound for overlays that carry none.
    pub min_zoom: u32,
    /// Upper zoom bound for overlays that carry none.
    pub max_zoom: u32,
    /// Quiet period before a view change triggers a pass.
    pub debounce: Duration,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            padding: 0.0,
            min_zoom: 6,
            max_zoom: 16,
            debounce: Duration::from_millis(100),
        }
    }
}

impl ManagerOptions {
    /// Check that the default zoom range is ordered and that padding is a finite,
    /// non-negative margin.
    pub fn validate(&self) -> Result<(), ManagerError> {
        if self.min_zoom > self.max_zoom {
            return Err(ManagerError::InvalidOptions(format!(
                "default zoom range {}..={} is inverted",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(ManagerError::InvalidOptions(format!(
                "padding {} must be finite and non-negative",
                self.padding
            )));
        }
        Ok(())
    }
}

struct Slot<O> {
    generation: u32,
    overlay: O,
}

/// Tracks overlays and toggles their visibility against the host's view.
///
/// Overlays are shown only when their position lies in the padded viewport and the host's
/// zoom lies in their zoom range. A global visibility intent ([`Manager::show`],
/// [`Manager::hide`], [`Manager::toggle`]) and a filter further decide which matching
/// overlays are displayed. Overlays that leave the view stay attached to the host and are
/// only hidden.
///
/// The manager owns the host and every registered overlay. It never subscribes to the host:
/// forward view changes with [`Manager::notify`] and drive the schedule with
/// [`Manager::poll`].
pub struct Manager<H, O> {
    host: H,
    slots: Vec<Option<Slot<O>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    order: Vec<OverlayId>,
    options: ManagerOptions,
    visible: bool,
    filter: OverlayFilter<O>,
    custom_filter: Option<OverlayFilter<O>>,
    debouncer: Debouncer,
}

impl<H: core::fmt::Debug, O> core::fmt::Debug for Manager<H, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Manager")
            .field("host", &self.host)
            .field("overlays", &self.order.len())
            .field("free_list", &self.free_list.len())
            .field("options", &self.options)
            .field("visible", &self.visible)
            .field("custom_filter", &self.custom_filter.is_some())
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}

impl<H, O> Manager<H, O>
where
    O: Overlay,
    H: MapHost<O::Node>,
{
    /// Create a manager with default options.
    pub fn new(host: H) -> Self {
        Self::build(host, ManagerOptions::default())
    }

    /// Create a manager with the given options, validating them once.
    pub fn with_options(host: H, options: ManagerOptions) -> Result<Self, ManagerError> {
        options.validate()?;
        Ok(Self::build(host, options))
    }

    fn build(host: H, options: ManagerOptions) -> Self {
        Self {
            host,
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            order: Vec::new(),
            options,
            visible: true,
            filter: Box::new(|_| true),
            custom_filter: None,
            debouncer: Debouncer::new(options.debounce),
        }
    }

    /// Replace the configured filter used when no custom filter is active.
    pub fn set_filter(&mut self, filter: impl Fn(&O) -> bool + 'static) {
        self.filter = Box::new(filter);
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host. Follow view changes with [`Manager::notify`].
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Options the manager was built with.
    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    /// Global visibility intent.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of registered overlays.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no overlay is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns true if `id` refers to a registered overlay.
    pub fn contains(&self, id: OverlayId) -> bool {
        self.slot(id).is_some()
    }

    /// The overlay behind `id`.
    pub fn get(&self, id: OverlayId) -> Option<&O> {
        self.slot(id).map(|s| &s.overlay)
    }

    /// Mutable access to the overlay behind `id`.
    pub fn get_mut(&mut self, id: OverlayId) -> Option<&mut O> {
        let slot = self.slots.get_mut(id.idx())?.as_mut()?;
        (slot.generation == id.1).then_some(&mut slot.overlay)
    }

    /// Registered overlays in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (OverlayId, &O)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.get(id).map(|o| (id, o)))
    }

    /// Register an overlay.
    ///
    /// Zoom bounds come from `opts`, else from the overlay's attributes, else from the
    /// manager defaults. Tracking state starts cleared. No pass runs; call [`Manager::show`]
    /// or use [`Manager::add_overlays`].
    pub fn add_overlay(
        &mut self,
        mut overlay: O,
        opts: AddOptions,
    ) -> Result<OverlayId, ManagerError> {
        self.prepare(&mut overlay, opts)?;
        Ok(self.insert(overlay))
    }

    /// Register several overlays, then run [`Manager::show`] without a filter.
    ///
    /// Every overlay is validated first; on error nothing is registered.
    pub fn add_overlays(
        &mut self,
        overlays: impl IntoIterator<Item = O>,
        opts: AddOptions,
    ) -> Result<Vec<OverlayId>, ManagerError> {
        let mut prepared = Vec::new();
        for mut overlay in overlays {
            self.prepare(&mut overlay, opts)?;
            prepared.push(overlay);
        }
        let ids = prepared.into_iter().map(|o| self.insert(o)).collect();
        self.show(None);
        Ok(ids)
    }

    /// Detach and drop an overlay regardless of its visibility.
    ///
    /// Returns the overlay with its tracking state cleared, or `None` for a stale id.
    pub fn remove_overlay(&mut self, id: OverlayId) -> Option<O> {
        if !self.contains(id) {
            return None;
        }
        self.order.retain(|&o| o != id);
        let slot = self.slots[id.idx()].take()?;
        self.free_list.push(id.idx());
        let mut overlay = slot.overlay;
        Self::release(&mut self.host, &mut overlay);
        Some(overlay)
    }

    /// [`Manager::remove_overlay`] for each id; stale ids are skipped.
    pub fn remove_overlays(&mut self, ids: impl IntoIterator<Item = OverlayId>) -> Vec<O> {
        ids.into_iter()
            .filter_map(|id| self.remove_overlay(id))
            .collect()
    }

    /// Like [`Manager::remove_overlay`], but only when the overlay is in the viewport.
    pub fn remove_visible_overlay(&mut self, id: OverlayId) -> Option<O> {
        if !self.get(id)?.attrs().is_in_viewport() {
            return None;
        }
        self.remove_overlay(id)
    }

    /// [`Manager::remove_visible_overlay`] for each id.
    pub fn remove_visible_overlays(&mut self, ids: impl IntoIterator<Item = OverlayId>) -> Vec<O> {
        ids.into_iter()
            .filter_map(|id| self.remove_visible_overlay(id))
            .collect()
    }

    /// Detach and drop every overlay.
    pub fn clear_overlays(&mut self) -> Vec<O> {
        let ids = core::mem::take(&mut self.order);
        let removed: Vec<O> = ids
            .into_iter()
            .filter_map(|id| {
                let slot = self.slots[id.idx()].take()?;
                self.free_list.push(id.idx());
                let mut overlay = slot.overlay;
                Self::release(&mut self.host, &mut overlay);
                Some(overlay)
            })
            .collect();
        log::debug!("cleared {} overlays", removed.len());
        removed
    }

    /// Detach and drop the overlays currently in the viewport; others stay registered.
    pub fn clear_visible_overlays(&mut self) -> Vec<O> {
        let ids: Vec<OverlayId> = self
            .iter()
            .filter(|(_, o)| o.attrs().is_in_viewport())
            .map(|(id, _)| id)
            .collect();
        self.remove_overlays(ids)
    }

    /// Set the global intent to visible and run a pass.
    ///
    /// `filter` is remembered for later view-change passes; `None` restores the configured
    /// filter.
    pub fn show(&mut self, filter: Option<OverlayFilter<O>>) -> PassStats {
        self.visible = true;
        self.custom_filter = filter;
        self.run_pass()
    }

    /// Set the global intent to hidden and run a pass.
    pub fn hide(&mut self, filter: Option<OverlayFilter<O>>) -> PassStats {
        self.visible = false;
        self.custom_filter = filter;
        self.run_pass()
    }

    /// Flip the global intent and run a pass.
    pub fn toggle(&mut self, filter: Option<OverlayFilter<O>>) -> PassStats {
        if self.visible {
            self.hide(filter)
        } else {
            self.show(filter)
        }
    }

    /// Run a pass with the current intent and filter.
    pub fn refresh(&mut self) -> PassStats {
        self.run_pass()
    }

    /// Overlays in the viewport whose zoom range contains `zoom`.
    ///
    /// Empty while the global intent is hidden.
    pub fn visible_at(&self, zoom: u32) -> impl Iterator<Item = OverlayId> + '_ {
        let visible = self.visible;
        self.iter()
            .filter(move |(_, o)| {
                let attrs = o.attrs();
                visible
                    && attrs.is_in_viewport()
                    && attrs.zoom_range().is_some_and(|r| r.contains(zoom))
            })
            .map(|(id, _)| id)
    }

    /// [`Manager::visible_at`] the host's current zoom.
    pub fn visible_overlays(&self) -> impl Iterator<Item = OverlayId> + '_ {
        self.visible_at(self.host.zoom())
    }

    /// First overlay whose attribute `key` loosely equals `value`.
    pub fn find_by_key(&self, value: impl Into<Value>, key: &str) -> Option<OverlayId> {
        let value = value.into();
        self.iter()
            .find(|(_, o)| {
                o.attrs()
                    .get(key)
                    .is_some_and(|v| canopy_records::loose_eq(&v, &value))
            })
            .map(|(id, _)| id)
    }

    /// All overlays accepted by `filter`, in registration order.
    pub fn find_where<'a>(
        &'a self,
        filter: impl Fn(&O) -> bool + 'a,
    ) -> impl Iterator<Item = OverlayId> + 'a {
        self.iter().filter(move |(_, o)| filter(o)).map(|(id, _)| id)
    }

    /// Positions of the overlays accepted by `filter`.
    pub fn points(&self, filter: impl Fn(&O) -> bool) -> Vec<Point> {
        self.iter()
            .filter(|(_, o)| filter(o))
            .map(|(_, o)| o.position())
            .collect()
    }

    /// Move the host view, then [`Manager::show`] without a filter.
    ///
    /// `zoom` defaults to the host's current zoom.
    pub fn center_and_zoom(&mut self, center: Point, zoom: Option<u32>) -> PassStats {
        let zoom = zoom.unwrap_or_else(|| self.host.zoom());
        self.host.set_center_and_zoom(center, zoom);
        self.debouncer.cancel();
        self.show(None)
    }

    /// Record a host view change. A pass runs once [`Manager::poll`] is called at or after
    /// `now + debounce` with no later change in between.
    pub fn notify(&mut self, change: ViewChange, now: Instant) {
        self.debouncer.schedule(change, now);
    }

    /// Deadline of the pending view-change pass.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Run the pending view-change pass if it is due. Returns whether a pass ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.debouncer.fire(now) {
            Some(change) => {
                log::trace!("running pass for {change:?}");
                self.run_pass();
                true
            }
            None => false,
        }
    }

    /// Host bounds grown by `padding` pixels on every side, in geographic space.
    pub fn padded_bounds(&self) -> GeoBounds {
        let bounds = self.host.visible_bounds();
        let sw = self.host.point_to_pixel(bounds.south_west);
        let ne = self.host.point_to_pixel(bounds.north_east);
        let p = self.options.padding;
        GeoBounds::new(
            self.host.pixel_to_point(Point::new(sw.x - p, sw.y + p)),
            self.host.pixel_to_point(Point::new(ne.x + p, ne.y - p)),
        )
    }

    // --- internals ---

    fn slot(&self, id: OverlayId) -> Option<&Slot<O>> {
        self.slots
            .get(id.idx())
            .and_then(|s| s.as_ref())
            .filter(|s| s.generation == id.1)
    }

    fn prepare(&self, overlay: &mut O, opts: AddOptions) -> Result<(), ManagerError> {
        let position = overlay.position();
        if !(position.x.is_finite() && position.y.is_finite()) {
            return Err(ManagerError::InvalidOverlay(format!(
                "position ({}, {}) is not finite",
                position.x, position.y
            )));
        }
        let attrs = overlay.attrs();
        let min = opts
            .min_zoom
            .or(attrs.min_zoom)
            .unwrap_or(self.options.min_zoom);
        let max = opts
            .max_zoom
            .or(attrs.max_zoom)
            .unwrap_or(self.options.max_zoom);
        if min > max {
            return Err(ManagerError::InvalidOverlay(format!(
                "zoom range {min}..={max} is inverted"
            )));
        }
        let attrs = overlay.attrs_mut();
        attrs.min_zoom = Some(min);
        attrs.max_zoom = Some(max);
        attrs.set_state(OverlayState::empty());
        Ok(())
    }

    fn release(host: &mut H, overlay: &mut O) {
        if overlay.attrs().is_added() {
            host.detach(&overlay.node());
            overlay.on_detach();
        }
        overlay.attrs_mut().set_state(OverlayState::empty());
    }

    fn insert(&mut self, overlay: O) -> OverlayId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Slot {
                generation,
                overlay,
            });
            #[allow(
                clippy::cast_possible_truncation,
                reason = "OverlayId uses 32-bit indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Slot {
                generation,
                overlay,
            }));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "OverlayId uses 32-bit indices."
            )]
            ((self.slots.len() - 1) as u32, generation)
        };
        let id = OverlayId::new(idx, generation);
        self.order.push(id);
        id
    }

    fn run_pass(&mut self) -> PassStats {
        let started = Instant::now();
        let zoom = self.host.zoom();
        let bounds = self.padded_bounds();
        let visible = self.visible;
        let filter: &dyn Fn(&O) -> bool = match &self.custom_filter {
            Some(f) => f.as_ref(),
            None => self.filter.as_ref(),
        };
        let mut stats = PassStats::default();

        for id in &self.order {
            let Some(slot) = self.slots.get_mut(id.idx()).and_then(|s| s.as_mut()) else {
                continue;
            };
            let overlay = &mut slot.overlay;
            stats.scanned += 1;
            let state = overlay.attrs().state();
            let in_range = overlay
                .attrs()
                .zoom_range()
                .is_some_and(|r| r.contains(zoom));

            if in_range && bounds.contains(overlay.position()) {
                overlay.attrs_mut().set(OverlayState::IN_VIEWPORT, true);
                if !state.contains(OverlayState::ADDED) {
                    self.host.attach(&overlay.node());
                    overlay.on_attach();
                    stats.attached += 1;
                    // Overlays may arrive hidden, e.g. after a hide and re-registration.
                    if visible {
                        overlay.show();
                    } else {
                        overlay.hide();
                    }
                    let attrs = overlay.attrs_mut();
                    attrs.set(OverlayState::ADDED, true);
                    attrs.set(OverlayState::VISIBLE, visible);
                } else if filter(overlay) {
                    let shown = state.contains(OverlayState::VISIBLE);
                    if visible && !shown {
                        overlay.show();
                        overlay.attrs_mut().set(OverlayState::VISIBLE, true);
                        stats.shown += 1;
                    } else if !visible && shown {
                        overlay.hide();
                        overlay.attrs_mut().set(OverlayState::VISIBLE, false);
                        stats.hidden += 1;
                    }
                } else if state.contains(OverlayState::VISIBLE) {
                    overlay.hide();
                    overlay.attrs_mut().set(OverlayState::VISIBLE, false);
                    stats.hidden += 1;
                }
            } else if state.contains(OverlayState::ADDED) {
                overlay.attrs_mut().set(OverlayState::IN_VIEWPORT, false);
                if state.contains(OverlayState::VISIBLE) {
                    overlay.hide();
                    overlay.attrs_mut().set(OverlayState::VISIBLE, false);
                    stats.hidden += 1;
                }
            }
        }

        log::debug!(
            "toggle pass at zoom {zoom}: {} scanned, {} attached, {} shown, {} hidden in {:?}",
            stats.scanned,
            stats.attached,
            stats.shown,
            stats.hidden,
            started.elapsed()
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OverlayAttrs;
    use canopy_records::ZoomRange;
    use serde_json::json;

    /// Fixed view with a 10 px per degree projection, pixel `y` pointing down.
    #[derive(Debug)]
    struct FixedMap {
        zoom: u32,
        bounds: GeoBounds,
        attached: Vec<u32>,
        detached: Vec<u32>,
    }

    impl FixedMap {
        fn new(zoom: u32, sw: (f64, f64), ne: (f64, f64)) -> Self {
            Self {
                zoom,
                bounds: GeoBounds::new(sw.into(), ne.into()),
                attached: Vec::new(),
                detached: Vec::new(),
            }
        }
    }

    impl MapHost<u32> for FixedMap {
        fn zoom(&self) -> u32 {
            self.zoom
        }
        fn visible_bounds(&self) -> GeoBounds {
            self.bounds
        }
        fn point_to_pixel(&self, point: Point) -> Point {
            Point::new(point.x * 10.0, -point.y * 10.0)
        }
        fn pixel_to_point(&self, pixel: Point) -> Point {
            Point::new(pixel.x / 10.0, -pixel.y / 10.0)
        }
        fn attach(&mut self, node: &u32) {
            self.attached.push(*node);
        }
        fn detach(&mut self, node: &u32) {
            self.attached.retain(|n| n != node);
            self.detached.push(*node);
        }
        fn set_center_and_zoom(&mut self, center: Point, zoom: u32) {
            let half = (self.bounds.north_east - self.bounds.south_west) / 2.0;
            self.bounds = GeoBounds::new(center - half, center + half);
            self.zoom = zoom;
        }
    }

    #[derive(Debug)]
    struct Pin {
        node: u32,
        at: Point,
        shown: bool,
        show_calls: u32,
        hide_calls: u32,
        lifecycle: Vec<&'static str>,
        attrs: OverlayAttrs,
    }

    impl Pin {
        fn new(node: u32, x: f64, y: f64) -> Self {
            let mut attrs = OverlayAttrs::new();
            attrs.insert("id", node);
            Self {
                node,
                at: Point::new(x, y),
                shown: true,
                show_calls: 0,
                hide_calls: 0,
                lifecycle: Vec::new(),
                attrs,
            }
        }

        fn zoom(mut self, min: u32, max: u32) -> Self {
            self.attrs.min_zoom = Some(min);
            self.attrs.max_zoom = Some(max);
            self
        }
    }

    impl Overlay for Pin {
        type Node = u32;
        fn node(&self) -> u32 {
            self.node
        }
        fn position(&self) -> Point {
            self.at
        }
        fn show(&mut self) {
            self.shown = true;
            self.show_calls += 1;
        }
        fn hide(&mut self) {
            self.shown = false;
            self.hide_calls += 1;
        }
        fn attrs(&self) -> &OverlayAttrs {
            &self.attrs
        }
        fn attrs_mut(&mut self) -> &mut OverlayAttrs {
            &mut self.attrs
        }
        fn on_attach(&mut self) {
            self.lifecycle.push("attach");
        }
        fn on_detach(&mut self) {
            self.lifecycle.push("detach");
        }
    }

    fn manager(zoom: u32) -> Manager<FixedMap, Pin> {
        Manager::new(FixedMap::new(zoom, (0.0, 0.0), (10.0, 10.0)))
    }

    #[test]
    fn registration_resolves_zoom_bounds() {
        let mut m = manager(7);
        let a = m.add_overlay(Pin::new(1, 1.0, 1.0), AddOptions::default()).unwrap();
        let b = m
            .add_overlay(Pin::new(2, 1.0, 1.0).zoom(3, 4), AddOptions::default())
            .unwrap();
        let c = m
            .add_overlay(
                Pin::new(3, 1.0, 1.0).zoom(3, 4),
                AddOptions::zoom(ZoomRange::new(8, 9)),
            )
            .unwrap();
        assert_eq!(m.get(a).unwrap().attrs().zoom_range(), Some(ZoomRange::new(6, 16)));
        assert_eq!(m.get(b).unwrap().attrs().zoom_range(), Some(ZoomRange::new(3, 4)));
        assert_eq!(m.get(c).unwrap().attrs().zoom_range(), Some(ZoomRange::new(8, 9)));
        assert!(m.host().attached.is_empty(), "add_overlay alone runs no pass");
    }

    #[test]
    fn invalid_overlays_are_rejected() {
        let mut m = manager(7);
        let err = m
            .add_overlay(Pin::new(1, f64::NAN, 1.0), AddOptions::default())
            .unwrap_err();
        assert!(matches!(err, ManagerError::InvalidOverlay(_)));
        assert!(
            m.add_overlay(Pin::new(2, 1.0, 1.0).zoom(9, 3), AddOptions::default())
                .is_err()
        );
        let batch = m.add_overlays(
            [Pin::new(3, 1.0, 1.0), Pin::new(4, f64::INFINITY, 0.0)],
            AddOptions::default(),
        );
        assert!(batch.is_err());
        assert!(m.is_empty(), "failed registration leaves the manager unchanged");
    }

    #[test]
    fn shows_inside_zoom_range_and_hides_outside() {
        let mut m = manager(7);
        let ids = m
            .add_overlays([Pin::new(1, 5.0, 5.0).zoom(5, 10)], AddOptions::default())
            .unwrap();
        let id = ids[0];
        let attrs = m.get(id).unwrap().attrs();
        assert!(attrs.is_added() && attrs.is_visible() && attrs.is_in_viewport());
        assert_eq!(m.host().attached, vec![1]);

        m.host_mut().zoom = 11;
        m.refresh();
        let pin = m.get(id).unwrap();
        assert!(pin.attrs().is_added(), "leaving the range keeps the node attached");
        assert!(!pin.attrs().is_in_viewport());
        assert!(!pin.attrs().is_visible());
        assert!(!pin.shown);
        assert_eq!(m.host().attached, vec![1]);
        assert!(m.host().detached.is_empty());
    }

    #[test]
    fn repeated_show_does_not_churn() {
        let mut m = manager(7);
        let id = m
            .add_overlays([Pin::new(1, 5.0, 5.0)], AddOptions::default())
            .unwrap()[0];
        let stats = m.show(None);
        assert_eq!(stats, PassStats { scanned: 1, ..PassStats::default() });
        m.show(None);
        let pin = m.get(id).unwrap();
        assert_eq!((pin.show_calls, pin.hide_calls), (1, 0), "only the attach shows");
        assert_eq!(m.host().attached.len(), 1, "attached exactly once");
    }

    #[test]
    fn hide_then_show_transitions_once() {
        let mut m = manager(7);
        let id = m
            .add_overlays([Pin::new(1, 5.0, 5.0)], AddOptions::default())
            .unwrap()[0];
        assert_eq!(m.hide(None).hidden, 1);
        assert_eq!(m.hide(None).hidden, 0);
        assert!(!m.get(id).unwrap().shown);
        assert_eq!(m.toggle(None).shown, 1);
        assert!(m.is_visible());
        let pin = m.get(id).unwrap();
        assert_eq!((pin.show_calls, pin.hide_calls), (2, 1));
    }

    #[test]
    fn first_attach_shows_overlays_that_arrive_hidden() {
        let mut m = manager(7);
        let mut hidden = Pin::new(1, 5.0, 5.0);
        hidden.shown = false;
        let id = m.add_overlays([hidden], AddOptions::default()).unwrap()[0];
        let pin = m.get(id).unwrap();
        assert!(pin.attrs().is_visible());
        assert_eq!(pin.shown, pin.attrs().is_visible());
    }

    #[test]
    fn reregistered_overlay_displays_what_its_flags_say() {
        let mut m = manager(7);
        let id = m
            .add_overlays([Pin::new(1, 5.0, 5.0)], AddOptions::default())
            .unwrap()[0];
        m.hide(None);
        let pin = m.remove_overlay(id).unwrap();
        assert!(!pin.shown);

        let id = m.add_overlays([pin], AddOptions::default()).unwrap()[0];
        m.show(None);
        let pin = m.get(id).unwrap();
        assert!(pin.attrs().is_visible());
        assert_eq!(pin.shown, pin.attrs().is_visible());
        assert_eq!(m.visible_overlays().count(), 1);
    }

    #[test]
    fn options_are_validated_at_construction() {
        let host = || FixedMap::new(7, (0.0, 0.0), (10.0, 10.0));
        let inverted = ManagerOptions {
            min_zoom: 16,
            max_zoom: 6,
            ..ManagerOptions::default()
        };
        assert!(matches!(
            Manager::<_, Pin>::with_options(host(), inverted),
            Err(ManagerError::InvalidOptions(_))
        ));
        for padding in [f64::NAN, f64::INFINITY, -1.0] {
            let options = ManagerOptions {
                padding,
                ..ManagerOptions::default()
            };
            assert!(
                Manager::<_, Pin>::with_options(host(), options).is_err(),
                "padding {padding} accepted"
            );
        }
        assert!(ManagerOptions::default().validate().is_ok());
        let single_level = ManagerOptions {
            min_zoom: 9,
            max_zoom: 9,
            ..ManagerOptions::default()
        };
        let mut m = Manager::with_options(host(), single_level).unwrap();
        let id = m.add_overlay(Pin::new(1, 5.0, 5.0), AddOptions::default()).unwrap();
        assert_eq!(m.get(id).unwrap().attrs().zoom_range(), Some(ZoomRange::new(9, 9)));
    }

    #[test]
    fn first_attach_while_hidden_hides_immediately() {
        let mut m = manager(7);
        let id = m.add_overlay(Pin::new(1, 5.0, 5.0), AddOptions::default()).unwrap();
        m.hide(None);
        let pin = m.get(id).unwrap();
        assert!(pin.attrs().is_added());
        assert!(!pin.attrs().is_visible());
        assert!(!pin.shown);
        assert_eq!(m.host().attached, vec![1]);
    }

    #[test]
    fn filter_rejection_forces_hide_and_is_remembered() {
        let mut m = manager(7);
        let ids = m
            .add_overlays(
                [Pin::new(1, 5.0, 5.0), Pin::new(2, 6.0, 6.0)],
                AddOptions::default(),
            )
            .unwrap();
        m.show(Some(Box::new(|p: &Pin| p.node == 1)));
        assert!(m.get(ids[0]).unwrap().attrs().is_visible());
        assert!(!m.get(ids[1]).unwrap().attrs().is_visible());

        // A debounced pass reuses the remembered filter.
        let t0 = Instant::now();
        m.notify(ViewChange::DragEnd, t0);
        assert!(m.poll(t0 + Duration::from_millis(100)));
        assert!(!m.get(ids[1]).unwrap().attrs().is_visible());

        // No filter restores the configured one.
        m.show(None);
        assert!(m.get(ids[1]).unwrap().attrs().is_visible());
    }

    #[test]
    fn configured_filter_applies_without_custom_filter() {
        let mut m = manager(7);
        m.set_filter(|p: &Pin| p.node != 2);
        let ids = m
            .add_overlays(
                [Pin::new(1, 5.0, 5.0), Pin::new(2, 6.0, 6.0)],
                AddOptions::default(),
            )
            .unwrap();
        // First attach ignores the filter; the next pass applies it.
        assert!(m.get(ids[1]).unwrap().attrs().is_visible());
        m.refresh();
        assert!(m.get(ids[0]).unwrap().attrs().is_visible());
        assert!(!m.get(ids[1]).unwrap().attrs().is_visible());
    }

    #[test]
    fn visible_at_respects_ranges_and_intent() {
        let mut m = manager(4);
        let ids = m
            .add_overlays(
                [
                    Pin::new(1, 1.0, 1.0).zoom(1, 5),
                    Pin::new(2, 2.0, 2.0).zoom(3, 8),
                    Pin::new(3, 3.0, 3.0).zoom(6, 10),
                ],
                AddOptions::default(),
            )
            .unwrap();
        let at4: Vec<_> = m.visible_at(4).collect();
        assert_eq!(at4, vec![ids[0], ids[1]]);
        assert_eq!(m.visible_overlays().collect::<Vec<_>>(), at4);
        assert_eq!(m.visible_at(7).collect::<Vec<_>>(), vec![ids[1]]);
        m.hide(None);
        assert_eq!(m.visible_at(4).count(), 0);
    }

    #[test]
    fn remove_visible_only_when_in_viewport() {
        let mut m = manager(7);
        let ids = m
            .add_overlays(
                [Pin::new(1, 5.0, 5.0), Pin::new(2, 50.0, 50.0)],
                AddOptions::default(),
            )
            .unwrap();
        assert!(m.remove_visible_overlay(ids[1]).is_none());
        assert!(m.contains(ids[1]));
        let removed = m.remove_visible_overlay(ids[0]).unwrap();
        assert_eq!(removed.node, 1);
        assert_eq!(removed.attrs().state(), OverlayState::empty());
        assert_eq!(m.host().detached, vec![1]);
        assert!(m.remove_overlay(ids[0]).is_none(), "stale id");
        let never_attached = m.remove_overlay(ids[1]).unwrap();
        assert_eq!(never_attached.node, 2);
        assert_eq!(m.host().detached, vec![1], "unattached nodes are not detached");
        assert!(m.is_empty());
    }

    #[test]
    fn batch_removal_skips_stale_and_out_of_view_ids() {
        let mut m = manager(7);
        let ids = m
            .add_overlays(
                [
                    Pin::new(1, 5.0, 5.0),
                    Pin::new(2, 50.0, 50.0),
                    Pin::new(3, 6.0, 6.0),
                    Pin::new(4, 7.0, 7.0),
                ],
                AddOptions::default(),
            )
            .unwrap();
        let stale = ids[0];
        m.remove_overlay(stale).unwrap();

        let removed = m.remove_visible_overlays([stale, ids[1], ids[2]]);
        assert_eq!(removed.iter().map(|p| p.node).collect::<Vec<_>>(), vec![3]);
        assert!(m.contains(ids[1]), "out-of-view overlay stays registered");

        let removed = m.remove_overlays([ids[2], ids[1], stale, ids[3]]);
        assert_eq!(removed.iter().map(|p| p.node).collect::<Vec<_>>(), vec![2, 4]);
        assert!(removed.iter().all(|p| p.attrs().state() == OverlayState::empty()));
        assert!(m.is_empty());
        assert_eq!(m.host().detached, vec![1, 3, 4]);
    }

    #[test]
    fn lifecycle_hooks_follow_the_host() {
        let mut m = manager(7);
        let id = m
            .add_overlays([Pin::new(1, 5.0, 5.0)], AddOptions::default())
            .unwrap()[0];
        m.host_mut().zoom = 20;
        m.refresh();
        m.host_mut().zoom = 7;
        m.refresh();
        assert_eq!(m.get(id).unwrap().lifecycle, vec!["attach"], "attached once");
        let pin = m.remove_overlay(id).unwrap();
        assert_eq!(pin.lifecycle, vec!["attach", "detach"]);
    }

    #[test]
    fn clear_visible_keeps_others() {
        let mut m = manager(7);
        let ids = m
            .add_overlays(
                [
                    Pin::new(1, 5.0, 5.0),
                    Pin::new(2, 50.0, 50.0),
                    Pin::new(3, 6.0, 6.0),
                ],
                AddOptions::default(),
            )
            .unwrap();
        let removed = m.clear_visible_overlays();
        assert_eq!(removed.iter().map(|p| p.node).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(m.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![ids[1]]);
        assert_eq!(m.clear_overlays().len(), 1);
        assert!(m.is_empty());
        assert!(m.host().attached.is_empty());
    }

    #[test]
    fn slots_are_reused_with_new_generation() {
        let mut m = manager(7);
        let a = m.add_overlay(Pin::new(1, 5.0, 5.0), AddOptions::default()).unwrap();
        m.remove_overlay(a);
        let b = m.add_overlay(Pin::new(2, 5.0, 5.0), AddOptions::default()).unwrap();
        assert_ne!(a, b);
        assert!(!m.contains(a));
        assert!(m.get(a).is_none());
        assert_eq!(m.get(b).unwrap().node, 2);
    }

    #[test]
    fn padding_grows_bounds_in_pixels() {
        let host = FixedMap::new(7, (0.0, 0.0), (10.0, 10.0));
        let mut m: Manager<_, Pin> = Manager::with_options(
            host,
            ManagerOptions {
                padding: 20.0,
                ..ManagerOptions::default()
            },
        )
        .unwrap();
        assert_eq!(
            m.padded_bounds(),
            GeoBounds::new(Point::new(-2.0, -2.0), Point::new(12.0, 12.0))
        );
        let id = m
            .add_overlays([Pin::new(1, 11.5, -1.5)], AddOptions::default())
            .unwrap()[0];
        assert!(m.get(id).unwrap().attrs().is_in_viewport());
    }

    #[test]
    fn debounce_coalesces_bursts() {
        let mut m = manager(7);
        m.add_overlay(Pin::new(1, 5.0, 5.0), AddOptions::default()).unwrap();
        let t0 = Instant::now();
        m.notify(ViewChange::DragEnd, t0);
        m.notify(ViewChange::ZoomEnd, t0 + Duration::from_millis(60));
        assert!(!m.poll(t0 + Duration::from_millis(100)), "superseded deadline");
        assert!(m.host().attached.is_empty());
        assert!(m.poll(t0 + Duration::from_millis(160)));
        assert_eq!(m.host().attached, vec![1]);
        assert!(!m.poll(t0 + Duration::from_millis(400)), "fires once");
        assert_eq!(m.pending_deadline(), None);
    }

    #[test]
    fn view_change_pass_keeps_hidden_intent() {
        let mut m = manager(7);
        let id = m
            .add_overlays([Pin::new(1, 5.0, 5.0)], AddOptions::default())
            .unwrap()[0];
        m.hide(None);
        let t0 = Instant::now();
        m.notify(ViewChange::Resize, t0);
        assert!(m.poll(t0 + Duration::from_millis(100)));
        assert!(!m.is_visible());
        assert!(!m.get(id).unwrap().attrs().is_visible());
    }

    #[test]
    fn center_and_zoom_moves_host_and_shows() {
        let mut m = manager(7);
        let id = m
            .add_overlay(Pin::new(1, 105.0, 105.0), AddOptions::default())
            .unwrap();
        m.hide(None);
        m.center_and_zoom(Point::new(105.0, 105.0), Some(9));
        assert_eq!(m.host().zoom, 9);
        assert!(m.is_visible());
        assert!(m.get(id).unwrap().attrs().is_visible());
    }

    #[test]
    fn queries() {
        let mut m = manager(7);
        let mut pin = Pin::new(7, 1.0, 2.0);
        pin.attrs.insert("kind", "pump");
        let ids = m
            .add_overlays([Pin::new(1, 5.0, 5.0), pin], AddOptions::default())
            .unwrap();
        assert_eq!(m.find_by_key("7", "id"), Some(ids[1]));
        assert_eq!(m.find_by_key(json!(7), "id"), Some(ids[1]));
        assert_eq!(m.find_by_key(16, "maxZoom"), Some(ids[0]));
        assert_eq!(m.find_by_key("valve", "kind"), None);
        assert_eq!(m.find_where(|p| p.node > 1).collect::<Vec<_>>(), vec![ids[1]]);
        assert_eq!(
            m.points(|_| true),
            vec![Point::new(5.0, 5.0), Point::new(1.0, 2.0)]
        );
    }
}
