// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Events: typed overlay events and keyed listener registries.
//!
//! [`Listeners`] keeps, per [`EventKind`], an ordered list of handlers. Handlers get a
//! mutable [`Event`] and may clear its `return_value`, which [`Listeners::dispatch`]
//! reports back to the emitter. Listeners are registered under a generated
//! [`ListenerKey`] or under a caller-chosen name; re-registering a name replaces the
//! previous handler.
//!
//! Event names parse with or without the `on` prefix:
//!
//! ```rust
//! use canopy_events::{Event, EventKind, Listeners};
//!
//! let mut listeners: Listeners<&str> = Listeners::new();
//! let kind: EventKind = "onclick".parse().unwrap();
//! listeners
//!     .add_named(kind, "veto", |e| {
//!         if e.payload == "locked" {
//!             e.prevent_default();
//!         }
//!     })
//!     .unwrap();
//!
//! assert!(listeners.dispatch(&mut Event::new(EventKind::Click, "open")));
//! assert!(!listeners.dispatch(&mut Event::new(EventKind::Click, "locked")));
//! ```

mod error;
mod listeners;
mod types;

pub use error::EventError;
pub use listeners::{Handler, Listeners};
pub use types::{Event, EventKind, ListenerKey};
