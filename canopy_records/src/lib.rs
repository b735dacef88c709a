// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Records: flatten hierarchical geo datasets into point records.
//!
//! Map datasets usually arrive as organisation trees: regions containing sites containing devices,
//! each node with an optional coordinate pair. Map overlays want the opposite shape: a flat list of
//! points, each knowing the zoom levels at which it should appear.
//!
//! - [`Flattener`] walks a tree (or an already flat list) of JSON nodes and emits [`GeoRecord`]s.
//! - Each record's zoom range is looked up from its depth through a level→zoom table.
//! - Parents summarize their direct children: a `count` and an averaged position, so a region can
//!   be drawn at low zoom where its members would be too dense.
//! - Ids carrying the attention marker are split into a watch-list subset.
//!
//! Configuration lives in [`FlattenOptions`]; every field has a default.
//!
//! ## Parent aggregates
//!
//! The aggregate position is a pairwise running average (`avg = (child + avg) / 2`), not an
//! arithmetic mean. Later children therefore weigh more. Existing consumers depend on these exact
//! values, so the behavior is kept.
//!
//! # Example
//!
//! ```rust
//! use canopy_records::{Flattener, FlattenOptions, RecordId, ZoomRange};
//! use serde_json::json;
//!
//! let options = FlattenOptions::default().with_zoom_levels([
//!     ("lv0", ZoomRange::new(6, 9)),
//!     ("lv1", ZoomRange::new(10, 13)),
//! ]);
//! let mut flattener = Flattener::new(options).unwrap();
//!
//! let records = flattener
//!     .flatten(json!([{
//!         "id": 1, "pid": 0, "x": 0, "y": 0,
//!         "children": [{"id": 2, "pid": 1, "x": 10, "y": 20}]
//!     }]))
//!     .unwrap();
//!
//! // The parent takes its position and count from its only child.
//! assert_eq!((records[0].x, records[0].y, records[0].count), (10.0, 20.0, Some(1)));
//! assert_eq!(records[1].zoom(), Some(ZoomRange::new(10, 13)));
//!
//! // Queries compare loosely, so "2" finds the numeric id 2.
//! assert_eq!(flattener.find_by_id("2")[0].id, RecordId::Int(2));
//! ```

mod error;
mod flatten;
mod options;
mod types;
mod value;

pub use error::FlattenError;
pub use flatten::{DEFAULT_KEY, Flattener};
pub use options::{ConvertHook, FlattenOptions};
pub use types::{GeoRecord, RecordId, ZoomRange};
pub use value::loose_eq;
