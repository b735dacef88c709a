// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flattening options.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::FlattenError;
use crate::types::{GeoRecord, ZoomRange};

/// Per-node conversion hook.
///
/// Runs after the default conversion with the converted record and the source node.
/// Leaving the record untouched keeps the default conversion; assigning `*target`
/// replaces it outright.
pub type ConvertHook = Box<dyn Fn(&mut GeoRecord, &Map<String, Value>)>;

/// Options controlling [`Flattener`](crate::Flattener).
///
/// Every field has a default; see [`FlattenOptions::default`].
pub struct FlattenOptions {
    /// Key holding a node's children. Default `"children"`.
    pub children_key: String,
    /// Key holding a node's level. Default `"level"`.
    pub level_key: String,
    /// Prefix of the keys in [`FlattenOptions::zoom_by_level`]. Default `"lv"`.
    pub level_prefix: String,
    /// Zoom range per level, keyed by `level_prefix + level` (for example `"lv0"`).
    ///
    /// Levels without an entry produce records with no zoom bounds.
    pub zoom_by_level: BTreeMap<String, ZoomRange>,
    /// Substring of an id marking it as part of the attention subset. Default `"80001"`.
    ///
    /// An empty marker disables attention handling.
    pub attention_marker: String,
    /// Whether parents receive averaged child coordinates. Default `true`.
    ///
    /// When false only the child `count` is propagated. Tree mode only.
    pub compute_parent_aggregates: bool,
    /// Keep the source after flattening. Default `false`.
    pub cache_source: bool,
    /// Treat the source as a tree (`true`, default) or as an already flat list.
    pub tree_shaped: bool,
    /// Optional per-node conversion hook.
    pub convert: Option<ConvertHook>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            children_key: "children".into(),
            level_key: "level".into(),
            level_prefix: "lv".into(),
            zoom_by_level: BTreeMap::new(),
            attention_marker: "80001".into(),
            compute_parent_aggregates: true,
            cache_source: false,
            tree_shaped: true,
            convert: None,
        }
    }
}

impl fmt::Debug for FlattenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlattenOptions")
            .field("children_key", &self.children_key)
            .field("level_key", &self.level_key)
            .field("level_prefix", &self.level_prefix)
            .field("zoom_by_level", &self.zoom_by_level)
            .field("attention_marker", &self.attention_marker)
            .field("compute_parent_aggregates", &self.compute_parent_aggregates)
            .field("cache_source", &self.cache_source)
            .field("tree_shaped", &self.tree_shaped)
            .field("convert", &self.convert.is_some())
            .finish()
    }
}

impl FlattenOptions {
    /// Set the level→zoom table.
    pub fn with_zoom_levels<I, K>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = (K, ZoomRange)>,
        K: Into<String>,
    {
        self.zoom_by_level = levels.into_iter().map(|(k, z)| (k.into(), z)).collect();
        self
    }

    /// Set the conversion hook.
    pub fn with_convert(
        mut self,
        hook: impl Fn(&mut GeoRecord, &Map<String, Value>) + 'static,
    ) -> Self {
        self.convert = Some(Box::new(hook));
        self
    }

    /// Zoom range configured for `level`, if any.
    pub fn zoom_for_level(&self, level: u32) -> Option<ZoomRange> {
        self.zoom_by_level
            .get(&format!("{}{}", self.level_prefix, level))
            .copied()
    }

    pub(crate) fn validate(&self) -> Result<(), FlattenError> {
        if self.tree_shaped && self.children_key.is_empty() {
            return Err(FlattenError::InvalidOptions(
                "children_key must not be empty".into(),
            ));
        }
        if self.level_key.is_empty() {
            return Err(FlattenError::InvalidOptions(
                "level_key must not be empty".into(),
            ));
        }
        if let Some((key, _)) = self.zoom_by_level.iter().find(|(_, z)| !z.is_valid()) {
            return Err(FlattenError::InvalidOptions(format!(
                "zoom range for {key} is inverted"
            )));
        }
        Ok(())
    }
}
