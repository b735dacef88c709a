// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event kinds, event values, and listener keys.

use core::fmt;
use core::str::FromStr;

use crate::error::EventError;

/// Kinds of overlay events.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Primary button click.
    Click,
    /// Double click.
    DoubleClick,
    /// Secondary button click.
    RightClick,
    /// Pointer entered the overlay.
    MouseOver,
    /// Pointer left the overlay.
    MouseOut,
    /// Button pressed over the overlay.
    MouseDown,
    /// Button released over the overlay.
    MouseUp,
    /// A drag began.
    DragStart,
    /// The overlay moved during a drag.
    Dragging,
    /// A drag finished.
    DragEnd,
    /// The overlay was displayed for the first time.
    Load,
    /// The overlay was removed.
    Remove,
    /// The overlay's context menu was removed.
    RemoveContextMenu,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Click,
        Self::DoubleClick,
        Self::RightClick,
        Self::MouseOver,
        Self::MouseOut,
        Self::MouseDown,
        Self::MouseUp,
        Self::DragStart,
        Self::Dragging,
        Self::DragEnd,
        Self::Load,
        Self::Remove,
        Self::RemoveContextMenu,
    ];

    /// Bare event name, without the `on` prefix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DoubleClick => "dblclick",
            Self::RightClick => "rightclick",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::DragStart => "dragstart",
            Self::Dragging => "dragging",
            Self::DragEnd => "dragend",
            Self::Load => "load",
            Self::Remove => "remove",
            Self::RemoveContextMenu => "removecontextmenu",
        }
    }
}

/// Renders the `on`-prefixed name, e.g. `onclick`.
impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "on{}", self.name())
    }
}

/// Parses `click` and `onclick` alike. Names are case sensitive.
impl FromStr for EventKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_prefix("on").unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|k| k.name() == bare)
            .ok_or_else(|| EventError::UnknownKind(s.to_owned()))
    }
}

/// An event being dispatched.
///
/// Handlers may clear [`Event::return_value`] (see [`Event::prevent_default`]); the final
/// value is what [`Listeners::dispatch`](crate::Listeners::dispatch) returns.
#[derive(Clone, Debug, PartialEq)]
pub struct Event<P> {
    /// What happened.
    pub kind: EventKind,
    /// Event data.
    pub payload: P,
    /// Starts `true`.
    pub return_value: bool,
}

impl<P> Event<P> {
    /// A fresh event with `return_value` set.
    pub fn new(kind: EventKind, payload: P) -> Self {
        Self {
            kind,
            payload,
            return_value: true,
        }
    }

    /// Clear [`Event::return_value`].
    pub fn prevent_default(&mut self) {
        self.return_value = false;
    }
}

/// Key identifying a registered listener.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKey {
    /// Assigned by the registry; unique within it.
    Generated(u64),
    /// Chosen by the caller; matches `[A-Za-z0-9_-]+`.
    Named(String),
}

impl ListenerKey {
    /// Validate and wrap a caller-chosen key.
    pub fn named(key: &str) -> Result<Self, EventError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self::Named(key.to_owned()))
        } else {
            Err(EventError::InvalidKey(key.to_owned()))
        }
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated(n) => write!(f, "#{n}"),
            Self::Named(s) => f.write_str(s),
        }
    }
}
