// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree-to-flat conversion, parent aggregation, and record queries.

use std::time::Instant;

use serde_json::{Map, Value};

use crate::error::FlattenError;
use crate::options::FlattenOptions;
use crate::types::{GeoRecord, RecordId};
use crate::value::{as_level, coordinate, loose_eq, raw_text};

/// Key used by record queries when none is given.
pub const DEFAULT_KEY: &str = "id";

/// Converts hierarchical (or already flat) datasets into [`GeoRecord`]s.
///
/// A flattener owns its latest output; queries read from it until the next
/// [`Flattener::flatten`] call replaces it.
pub struct Flattener {
    options: FlattenOptions,
    source: Vec<Value>,
    records: Vec<GeoRecord>,
    max_level: u32,
}

impl core::fmt::Debug for Flattener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Flattener")
            .field("options", &self.options)
            .field("source_len", &self.source.len())
            .field("records_len", &self.records.len())
            .field("max_level", &self.max_level)
            .finish_non_exhaustive()
    }
}

impl Flattener {
    /// Create a flattener, validating `options` once.
    pub fn new(options: FlattenOptions) -> Result<Self, FlattenError> {
        options.validate()?;
        Ok(Self {
            options,
            source: Vec::new(),
            records: Vec::new(),
            max_level: 0,
        })
    }

    /// Options this flattener was built with.
    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    /// Flatten `source`, replacing any previous output.
    ///
    /// `source` must be a non-empty JSON array of node objects. In tree mode the
    /// nodes' level fields are overwritten with their depth.
    pub fn flatten(&mut self, source: Value) -> Result<&[GeoRecord], FlattenError> {
        let Value::Array(mut nodes) = source else {
            return Err(FlattenError::InvalidInput("source must be an array of nodes"));
        };
        if nodes.is_empty() {
            return Err(FlattenError::InvalidInput("source is empty"));
        }

        let started = Instant::now();
        let mut pass = Pass::new(&self.options);
        let records = if self.options.tree_shaped {
            pass.walk(&mut nodes, 0)
        } else {
            pass.list(&nodes)
        };
        self.max_level = pass.max_level;
        self.records = records;
        log::debug!(
            "flattened {} top-level nodes into {} records (max level {}) in {:?}",
            nodes.len(),
            self.records.len(),
            self.max_level,
            started.elapsed()
        );
        self.source = if self.options.cache_source {
            nodes
        } else {
            Vec::new()
        };
        Ok(&self.records)
    }

    /// Records produced by the last flatten.
    pub fn records(&self) -> &[GeoRecord] {
        &self.records
    }

    /// Consume the flattener, keeping only its records.
    pub fn into_records(self) -> Vec<GeoRecord> {
        self.records
    }

    /// Source retained from the last flatten; empty unless
    /// [`FlattenOptions::cache_source`] is set.
    pub fn source(&self) -> &[Value] {
        &self.source
    }

    /// Deepest level seen during the last flatten.
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// All records whose `key` loosely equals `value`.
    ///
    /// See [`loose_eq`] for the comparison rules.
    pub fn find_by_key(&self, value: impl Into<Value>, key: &str) -> Vec<&GeoRecord> {
        let value = value.into();
        self.records
            .iter()
            .filter(|r| r.get(key).is_some_and(|v| loose_eq(&v, &value)))
            .collect()
    }

    /// All records whose id loosely equals `value`.
    pub fn find_by_id(&self, value: impl Into<Value>) -> Vec<&GeoRecord> {
        self.find_by_key(value, DEFAULT_KEY)
    }

    /// First record whose `key` loosely equals `value`.
    pub fn find_first_by_key(&self, value: impl Into<Value>, key: &str) -> Option<&GeoRecord> {
        let value = value.into();
        self.records
            .iter()
            .find(|r| r.get(key).is_some_and(|v| loose_eq(&v, &value)))
    }

    /// All records accepted by `predicate`.
    pub fn find_where(&self, predicate: impl Fn(&GeoRecord) -> bool) -> Vec<&GeoRecord> {
        self.records.iter().filter(|r| predicate(r)).collect()
    }
}

/// Count and averaged position summarizing a parent's direct children.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Aggregate {
    pub(crate) count: u32,
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl Aggregate {
    /// Summarize the emitted records at `level` that carry coordinates.
    pub(crate) fn of_children(children: &[GeoRecord], level: u32) -> Self {
        let mut agg = Self::default();
        for child in children
            .iter()
            .filter(|c| c.level == level && c.has_coordinates())
        {
            agg.count += match child.count {
                Some(c) if c > 0 => c,
                _ => 1,
            };
            // Pairwise running average, not a mean: later children weigh more.
            // Downstream output depends on these exact values.
            agg.x = (child.x + if agg.x != 0.0 { agg.x } else { child.x }) / 2.0;
            agg.y = (child.y + if agg.y != 0.0 { agg.y } else { child.y }) / 2.0;
        }
        agg
    }

    fn apply(self, record: &mut GeoRecord, with_position: bool) {
        record.count = Some(self.count);
        if with_position {
            record.x = self.x;
            record.y = self.y;
        }
    }
}

/// State of a single flatten call.
struct Pass<'a> {
    options: &'a FlattenOptions,
    /// Attention ids seen so far, in visit order.
    attention: Vec<RecordId>,
    max_level: u32,
}

impl<'a> Pass<'a> {
    fn new(options: &'a FlattenOptions) -> Self {
        Self {
            options,
            attention: Vec::new(),
            max_level: 0,
        }
    }

    fn convert(&mut self, node: &Map<String, Value>, level: u32) -> GeoRecord {
        let options = self.options;
        let raw_id = node.get("id").map(raw_text).unwrap_or_default();
        let mut record = GeoRecord::new(RecordId::parse(&raw_id));
        record.parent_id = node.get("pid").and_then(RecordId::from_value);
        record.name = node
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| node.get("text").and_then(Value::as_str))
            .unwrap_or_default()
            .to_owned();
        record.x = coordinate(node.get("x"));
        record.y = coordinate(node.get("y"));
        record.level = level;
        if let Some(zoom) = options.zoom_for_level(level) {
            record.min_zoom = Some(zoom.min);
            record.max_zoom = Some(zoom.max);
        }
        let marker = options.attention_marker.as_str();
        if !marker.is_empty() && raw_id.contains(marker) {
            record.is_attention = true;
            record.attention_id = Some(RecordId::parse(&raw_id.replacen(marker, "", 1)));
        }
        self.max_level = self.max_level.max(level);

        if let Some(hook) = &options.convert {
            hook(&mut record, node);
        }
        record
    }

    /// Tree mode: children are flattened before their parent's aggregate is taken.
    fn walk(&mut self, nodes: &mut [Value], level: u32) -> Vec<GeoRecord> {
        let mut out = Vec::new();
        for node in nodes.iter_mut() {
            let Value::Object(node) = node else {
                log::warn!("skipping non-object node at level {level}");
                continue;
            };
            node.insert(self.options.level_key.clone(), Value::from(level));
            let mut record = self.convert(node, level);

            let children = match node.get_mut(&self.options.children_key) {
                Some(Value::Array(children)) if !children.is_empty() => {
                    self.walk(children, level + 1)
                }
                _ => Vec::new(),
            };
            if !children.is_empty() {
                Aggregate::of_children(&children, level + 1)
                    .apply(&mut record, self.options.compute_parent_aggregates);
            }

            if record.is_attention {
                // Withheld together with its subtree; later records may match it.
                if let Some(id) = record.attention_id.take() {
                    self.attention.push(id);
                }
                continue;
            }
            if self.attention.contains(&record.id) {
                record.attention_id = Some(record.id.clone());
                record.is_attention = true;
            }
            if record.has_coordinates() {
                out.push(record);
            }
            out.extend(children);
        }
        out
    }

    /// Flat mode: one record per item, level read from the item itself.
    fn list(&mut self, nodes: &[Value]) -> Vec<GeoRecord> {
        let options = self.options;
        let level_key = options.level_key.as_str();
        nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| {
                let Value::Object(node) = node else {
                    log::warn!("skipping non-object item {i}");
                    return None;
                };
                let level = node.get(level_key).and_then(as_level).unwrap_or_else(|| {
                    log::warn!("item {i} has no usable `{level_key}`; assuming level 0");
                    0
                });
                Some(self.convert(node, level))
            })
            .collect()
    }
}
