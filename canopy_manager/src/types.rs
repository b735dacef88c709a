// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the manager: overlay identifiers, state flags, attributes, and bounds.

use canopy_records::{GeoRecord, ZoomRange};
use kurbo::Point;
use serde_json::{Map, Value};

/// Identifier for an overlay registered with a [`Manager`](crate::Manager).
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// - On registration, a fresh slot is allocated with generation `1`.
/// - On removal, the slot is freed; any `OverlayId` pointing at it becomes stale.
/// - When a freed slot is reused its generation is incremented, so stale ids never alias
///   a newly registered overlay.
///
/// Use [`Manager::contains`](crate::Manager::contains) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OverlayId(pub(crate) u32, pub(crate) u32);

impl OverlayId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Manager bookkeeping for one overlay.
    ///
    /// Only the manager writes these; overlays and callers read them through
    /// [`OverlayAttrs::state`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OverlayState: u8 {
        /// The overlay has been attached to the host's render tree.
        const ADDED       = 0b0000_0001;
        /// The overlay is currently displayed.
        const VISIBLE     = 0b0000_0010;
        /// The overlay matched the viewport and zoom range on the last pass.
        const IN_VIEWPORT = 0b0000_0100;
    }
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::empty()
    }
}

/// Attributes the manager reads from and writes onto each overlay.
///
/// `min_zoom`/`max_zoom` are resolved at registration (explicit options, then these fields,
/// then the manager defaults) and always set afterwards. `custom` carries free-form data for
/// [`Manager::find_by_key`](crate::Manager::find_by_key).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayAttrs {
    /// Lowest zoom at which the overlay may show.
    pub min_zoom: Option<u32>,
    /// Highest zoom at which the overlay may show.
    pub max_zoom: Option<u32>,
    /// Free-form attributes.
    pub custom: Map<String, Value>,
    state: OverlayState,
}

impl OverlayAttrs {
    /// Empty attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes carrying an explicit zoom range.
    pub fn with_zoom(range: ZoomRange) -> Self {
        Self {
            min_zoom: Some(range.min),
            max_zoom: Some(range.max),
            ..Self::default()
        }
    }

    /// Attributes mirroring a flattened record.
    ///
    /// The record's zoom bounds become the overlay's, and its identifying fields and
    /// custom attributes are copied into [`OverlayAttrs::custom`] under their wire names.
    pub fn from_record(record: &GeoRecord) -> Self {
        let mut custom = record.attrs.clone();
        for key in [
            "id",
            "pid",
            "name",
            "level",
            "count",
            "isMyAttention",
            "attentionId",
        ] {
            if let Some(value) = record.get(key) {
                custom.insert(key.to_owned(), value);
            }
        }
        Self {
            min_zoom: record.min_zoom,
            max_zoom: record.max_zoom,
            custom,
            state: OverlayState::empty(),
        }
    }

    /// Current manager state.
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Whether the overlay has been attached to the host.
    pub fn is_added(&self) -> bool {
        self.state.contains(OverlayState::ADDED)
    }

    /// Whether the overlay is currently displayed.
    pub fn is_visible(&self) -> bool {
        self.state.contains(OverlayState::VISIBLE)
    }

    /// Whether the overlay matched the viewport and zoom range on the last pass.
    pub fn is_in_viewport(&self) -> bool {
        self.state.contains(OverlayState::IN_VIEWPORT)
    }

    /// Zoom range when both bounds are set.
    pub fn zoom_range(&self) -> Option<ZoomRange> {
        Some(ZoomRange::new(self.min_zoom?, self.max_zoom?))
    }

    /// Look up an attribute by name. `minZoom` and `maxZoom` resolve to the zoom bounds.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "minZoom" => self.min_zoom.map(Value::from),
            "maxZoom" => self.max_zoom.map(Value::from),
            other => self.custom.get(other).cloned(),
        }
    }

    /// Insert a custom attribute, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.custom.insert(key.into(), value.into())
    }

    pub(crate) fn set_state(&mut self, state: OverlayState) {
        self.state = state;
    }

    pub(crate) fn set(&mut self, flag: OverlayState, on: bool) {
        self.state.set(flag, on);
    }
}

/// Geographic rectangle given by its south-west and north-east corners.
///
/// Containment is inclusive on all edges.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    /// Lowest longitude and latitude.
    pub south_west: Point,
    /// Highest longitude and latitude.
    pub north_east: Point,
}

impl GeoBounds {
    /// Create bounds from their corners.
    pub const fn new(south_west: Point, north_east: Point) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Whether `point` lies inside or on the edge of the bounds.
    pub fn contains(&self, point: Point) -> bool {
        self.south_west.x <= point.x
            && point.x <= self.north_east.x
            && self.south_west.y <= point.y
            && point.y <= self.north_east.y
    }

    /// Center of the bounds.
    pub fn center(&self) -> Point {
        self.south_west.midpoint(self.north_east)
    }
}

/// Per-registration overrides for [`Manager::add_overlay`](crate::Manager::add_overlay).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Overrides the overlay's own lower zoom bound.
    pub min_zoom: Option<u32>,
    /// Overrides the overlay's own upper zoom bound.
    pub max_zoom: Option<u32>,
}

impl AddOptions {
    /// Options forcing the given zoom range.
    pub fn zoom(range: ZoomRange) -> Self {
        Self {
            min_zoom: Some(range.min),
            max_zoom: Some(range.max),
        }
    }
}

/// Host view changes that schedule a visibility pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ViewChange {
    /// A zoom gesture or animation finished.
    ZoomEnd,
    /// A pan gesture finished.
    DragEnd,
    /// The host viewport was resized.
    Resize,
}

/// Counters from one visibility pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Overlays considered.
    pub scanned: usize,
    /// Overlays attached to the host for the first time.
    pub attached: usize,
    /// Overlays transitioned to shown.
    pub shown: usize,
    /// Overlays transitioned to hidden.
    pub hidden: usize,
}
