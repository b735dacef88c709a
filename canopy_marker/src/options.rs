// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marker construction options.

use canopy_manager::OverlayAttrs;
use kurbo::{Point, Size, Vec2};

/// Background image of a marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Icon {
    /// Image location.
    pub url: String,
    /// Rendered size in pixels; also the marker's initial size.
    pub size: Size,
}

impl Icon {
    /// An icon of the given size.
    pub fn new(url: impl Into<String>, size: Size) -> Self {
        Self {
            url: url.into(),
            size,
        }
    }
}

/// What a marker displays: an optional icon, a text label, and a count badge.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerContent {
    /// Label text.
    pub text: String,
    /// Badge text, typically a number.
    pub count: String,
    /// Whether the label is drawn.
    pub show_text: bool,
    /// Whether the badge is drawn.
    pub show_count: bool,
    /// Icon, if any.
    pub icon: Option<Icon>,
}

impl Default for MarkerContent {
    fn default() -> Self {
        Self {
            text: String::new(),
            count: String::new(),
            show_text: true,
            show_count: false,
            icon: None,
        }
    }
}

impl MarkerContent {
    /// Text-only content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Icon content with an optional label.
    pub fn icon(icon: Icon, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: Some(icon),
            ..Self::default()
        }
    }

    /// Show `count` in the badge.
    #[must_use]
    pub fn with_count(mut self, count: impl ToString) -> Self {
        self.count = count.to_string();
        self.show_count = true;
        self
    }

    /// True when there is neither text nor an icon.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.icon.is_none()
    }
}

/// Marker configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerOptions {
    /// Geographic position.
    pub position: Point,
    /// Displayed content.
    pub content: MarkerContent,
    /// Pixel offset of the marker's top-left corner from its projected position.
    pub anchor: Vec2,
    /// Whether the marker starts draggable.
    pub draggable: bool,
    /// Manager attributes (zoom range, custom data).
    pub attrs: OverlayAttrs,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            content: MarkerContent::default(),
            anchor: Vec2::ZERO,
            draggable: false,
            attrs: OverlayAttrs::new(),
        }
    }
}

impl MarkerOptions {
    /// Options for a marker at `position` showing `content`.
    pub fn new(position: Point, content: MarkerContent) -> Self {
        Self {
            position,
            content,
            ..Self::default()
        }
    }
}
