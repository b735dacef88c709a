// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public record types: identifiers, zoom ranges, and flattened records.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a record.
///
/// Source datasets mix numeric and textual ids (often numbers encoded as strings).
/// Ids that parse as integers are normalized to [`RecordId::Int`], everything else
/// is kept verbatim as [`RecordId::Text`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer id.
    Int(i64),
    /// Any id that is not an integer.
    Text(String),
}

impl RecordId {
    /// Parse an id from its textual form.
    ///
    /// ```
    /// use canopy_records::RecordId;
    /// assert_eq!(RecordId::parse("1234"), RecordId::Int(1234));
    /// assert_eq!(RecordId::parse("-17"), RecordId::Int(-17));
    /// assert_eq!(RecordId::parse("a7"), RecordId::Text("a7".into()));
    /// ```
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.parse::<i64>() {
            Ok(n) if !trimmed.is_empty() => Self::Int(n),
            _ => Self::Text(text.to_owned()),
        }
    }

    /// Read an id from a JSON value. `null` yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(
                n.as_i64()
                    .map(Self::Int)
                    .unwrap_or_else(|| Self::Text(n.to_string())),
            ),
            Value::String(s) => Some(Self::parse(s)),
            other => Some(Self::Text(other.to_string())),
        }
    }

    /// JSON form of this id.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<u32> for RecordId {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Inclusive range of map zoom levels in which an entity is visible.
///
/// Serialized with the `minZoom`/`maxZoom` names used by level→zoom tables, so a
/// table such as `{"lv0": {"minZoom": 6, "maxZoom": 9}}` deserializes directly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoomRange {
    /// Lowest zoom level (inclusive).
    #[serde(rename = "minZoom")]
    pub min: u32,
    /// Highest zoom level (inclusive).
    #[serde(rename = "maxZoom")]
    pub max: u32,
}

impl ZoomRange {
    /// Create a range from its inclusive bounds.
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `zoom` lies within the range.
    pub const fn contains(&self, zoom: u32) -> bool {
        self.min <= zoom && zoom <= self.max
    }

    /// False when the bounds are inverted.
    pub const fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

/// A flattened location record.
///
/// Produced by [`Flattener::flatten`](crate::Flattener::flatten) and never mutated afterwards.
/// Field names on the wire match the source datasets (`pid`, `minZoom`, `isMyAttention`, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    /// Unique id within the flattened output.
    pub id: RecordId,
    /// Id of the enclosing record, if the source carried one.
    #[serde(rename = "pid", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,
    /// Display label.
    #[serde(default)]
    pub name: String,
    /// Longitude-like coordinate. `0.0` means "no coordinate".
    #[serde(default)]
    pub x: f64,
    /// Latitude-like coordinate. `0.0` means "no coordinate".
    #[serde(default)]
    pub y: f64,
    /// Tree depth, 0-based.
    #[serde(default)]
    pub level: u32,
    /// Lowest zoom at which the record is shown.
    #[serde(rename = "minZoom", default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<u32>,
    /// Highest zoom at which the record is shown.
    #[serde(rename = "maxZoom", default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<u32>,
    /// Whether the record belongs to the attention (watch list) subset.
    #[serde(rename = "isMyAttention", default)]
    pub is_attention: bool,
    /// Id with the attention marker stripped; set only when flagged.
    #[serde(rename = "attentionId", default, skip_serializing_if = "Option::is_none")]
    pub attention_id: Option<RecordId>,
    /// Number of point-bearing children summarized by this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Free-form attributes added by a conversion hook.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

impl GeoRecord {
    /// A record with the given id and every other field empty.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: String::new(),
            x: 0.0,
            y: 0.0,
            level: 0,
            min_zoom: None,
            max_zoom: None,
            is_attention: false,
            attention_id: None,
            count: None,
            attrs: Map::new(),
        }
    }

    /// True when both coordinates are set (non-zero).
    pub fn has_coordinates(&self) -> bool {
        self.x != 0.0 && self.y != 0.0
    }

    /// Zoom range of the record when both bounds are known.
    pub fn zoom(&self) -> Option<ZoomRange> {
        Some(ZoomRange::new(self.min_zoom?, self.max_zoom?))
    }

    /// Look up a field or custom attribute by its wire name.
    ///
    /// Known fields take precedence; any other key is resolved against [`GeoRecord::attrs`].
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(self.id.to_value()),
            "pid" | "parentId" => self.parent_id.as_ref().map(RecordId::to_value),
            "name" => Some(Value::from(self.name.as_str())),
            "x" => Some(Value::from(self.x)),
            "y" => Some(Value::from(self.y)),
            "level" => Some(Value::from(self.level)),
            "minZoom" => self.min_zoom.map(Value::from),
            "maxZoom" => self.max_zoom.map(Value::from),
            "isMyAttention" => Some(Value::from(self.is_attention)),
            "attentionId" => self.attention_id.as_ref().map(RecordId::to_value),
            "count" => self.count.map(Value::from),
            other => self.attrs.get(other).cloned(),
        }
    }
}
