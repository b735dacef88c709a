// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The marker overlay.

use canopy_events::{Event, EventKind, ListenerKey, Listeners};
use canopy_manager::{Overlay, OverlayAttrs};
use canopy_records::GeoRecord;
use kurbo::{Point, Size, Vec2};
use serde_json::{Map, Value};

use crate::error::MarkerError;
use crate::options::{Icon, MarkerContent, MarkerOptions};

/// Host node handle of a marker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerKey(pub u64);

/// Data delivered with every marker event.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerEvent {
    /// Emitting marker.
    pub key: MarkerKey,
    /// Position of the marker in its collection, if any.
    pub index: Option<usize>,
    /// Marker position when the event fired.
    pub position: Point,
    /// The marker's custom attributes.
    pub attrs: Map<String, Value>,
}

/// A labelled map marker.
///
/// Markers are headless: they hold what a renderer needs (position, anchor, content, size,
/// display state) and emit [`MarkerEvent`]s to their listeners. `Load` fires the first time
/// the marker is attached to a host, `Remove` when it is removed.
pub struct Marker {
    key: MarkerKey,
    index: Option<usize>,
    position: Point,
    anchor: Vec2,
    content: MarkerContent,
    size: Size,
    draggable: bool,
    dragging: bool,
    displayed: bool,
    loaded: bool,
    attrs: OverlayAttrs,
    listeners: Listeners<MarkerEvent>,
}

impl core::fmt::Debug for Marker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Marker")
            .field("key", &self.key)
            .field("index", &self.index)
            .field("position", &self.position)
            .field("text", &self.content.text)
            .field("displayed", &self.displayed)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

fn check_position(p: Point) -> Result<Point, MarkerError> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(p)
    } else {
        Err(MarkerError::InvalidPosition { x: p.x, y: p.y })
    }
}

impl Marker {
    /// Build a marker.
    ///
    /// Fails when the content has neither text nor icon, or the position is not finite.
    pub fn new(key: MarkerKey, options: MarkerOptions) -> Result<Self, MarkerError> {
        if options.content.is_empty() {
            return Err(MarkerError::MissingContent);
        }
        let position = check_position(options.position)?;
        let size = options
            .content
            .icon
            .as_ref()
            .map_or(Size::ZERO, |icon| icon.size);
        Ok(Self {
            key,
            index: None,
            position,
            anchor: options.anchor,
            content: options.content,
            size,
            draggable: options.draggable,
            dragging: false,
            displayed: true,
            loaded: false,
            attrs: options.attrs,
            listeners: Listeners::new(),
        })
    }

    /// Build a marker for a flattened record.
    ///
    /// The label is the record name, the badge shows the record's child count, and the
    /// attributes carry the record's zoom range and identifying fields.
    pub fn from_record(
        key: MarkerKey,
        record: &GeoRecord,
        icon: Option<Icon>,
    ) -> Result<Self, MarkerError> {
        let mut content = MarkerContent {
            text: record.name.clone(),
            icon,
            ..MarkerContent::default()
        };
        if let Some(count) = record.count {
            content = content.with_count(count);
        }
        let options = MarkerOptions {
            position: Point::new(record.x, record.y),
            content,
            attrs: OverlayAttrs::from_record(record),
            ..MarkerOptions::default()
        };
        Self::new(key, options)
    }

    /// Host node handle.
    pub fn key(&self) -> MarkerKey {
        self.key
    }

    /// Position within the owning collection.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = Some(index);
    }

    /// Geographic position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Move the marker.
    pub fn set_position(&mut self, position: Point) -> Result<(), MarkerError> {
        self.position = check_position(position)?;
        Ok(())
    }

    /// Pixel offset from the projected position.
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Change the pixel offset.
    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    /// Top-left corner of the marker for a projected position.
    pub fn origin_at(&self, pixel: Point) -> Point {
        pixel + self.anchor
    }

    /// Displayed content.
    pub fn content(&self) -> &MarkerContent {
        &self.content
    }

    /// Replace the content. A new icon also resets the marker size.
    pub fn set_content(&mut self, content: MarkerContent) -> Result<(), MarkerError> {
        if content.is_empty() {
            return Err(MarkerError::MissingContent);
        }
        if let Some(icon) = &content.icon {
            self.size = icon.size;
        }
        self.content = content;
        Ok(())
    }

    /// Marker width in pixels.
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Set the width in pixels.
    pub fn set_width(&mut self, width: f64) {
        self.size.width = width;
    }

    /// Marker height in pixels.
    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Set the height in pixels.
    pub fn set_height(&mut self, height: f64) {
        self.size.height = height;
    }

    /// Allow dragging.
    pub fn enable_dragging(&mut self) {
        self.draggable = true;
    }

    /// Forbid dragging. A drag in progress ends without `DragEnd`.
    pub fn disable_dragging(&mut self) {
        self.draggable = false;
        self.dragging = false;
    }

    /// Whether the marker may be dragged.
    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether the marker is currently displayed.
    pub fn is_displayed(&self) -> bool {
        self.displayed
    }

    /// Whether `Load` has fired.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Register a handler.
    pub fn on(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&mut Event<MarkerEvent>) + 'static,
    ) -> ListenerKey {
        self.listeners.add(kind, handler)
    }

    /// Register a handler under a name, replacing any handler with the same name.
    pub fn on_named(
        &mut self,
        kind: EventKind,
        key: &str,
        handler: impl FnMut(&mut Event<MarkerEvent>) + 'static,
    ) -> Result<ListenerKey, MarkerError> {
        Ok(self.listeners.add_named(kind, key, handler)?)
    }

    /// Remove a handler. Returns whether one was removed.
    pub fn off(&mut self, kind: EventKind, key: &ListenerKey) -> bool {
        self.listeners.remove(kind, key)
    }

    /// Dispatch an event of `kind` and return its final `return_value`.
    pub fn emit(&mut self, kind: EventKind) -> bool {
        let payload = MarkerEvent {
            key: self.key,
            index: self.index,
            position: self.position,
            attrs: self.attrs.custom.clone(),
        };
        self.listeners.dispatch(&mut Event::new(kind, payload))
    }

    /// Start a drag. Emits `MouseDown` then `DragStart`; does nothing unless draggable.
    pub fn begin_drag(&mut self) -> bool {
        if !self.draggable {
            return false;
        }
        self.emit(EventKind::MouseDown);
        self.dragging = true;
        self.emit(EventKind::DragStart);
        true
    }

    /// Move the marker during a drag and emit `Dragging`.
    pub fn drag_to(&mut self, position: Point) -> Result<bool, MarkerError> {
        if !self.dragging {
            return Ok(false);
        }
        self.set_position(position)?;
        self.emit(EventKind::Dragging);
        Ok(true)
    }

    /// Finish a drag. Emits `DragEnd` then `MouseUp`.
    pub fn end_drag(&mut self) -> bool {
        if !self.dragging {
            return false;
        }
        self.dragging = false;
        self.emit(EventKind::DragEnd);
        self.emit(EventKind::MouseUp);
        true
    }

    /// Emit `Remove` and reset the display state so a later attach loads again.
    pub fn remove(&mut self) -> bool {
        self.dragging = false;
        self.loaded = false;
        self.emit(EventKind::Remove)
    }
}

impl Overlay for Marker {
    type Node = MarkerKey;

    fn node(&self) -> MarkerKey {
        self.key
    }

    fn position(&self) -> Point {
        self.position
    }

    fn show(&mut self) {
        self.displayed = true;
    }

    fn hide(&mut self) {
        self.displayed = false;
    }

    fn attrs(&self) -> &OverlayAttrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut OverlayAttrs {
        &mut self.attrs
    }

    fn on_attach(&mut self) {
        if !self.loaded {
            self.loaded = true;
            self.emit(EventKind::Load);
        }
    }

    fn on_detach(&mut self) {
        self.remove();
    }
}
