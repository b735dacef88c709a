// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loose comparisons and numeric coercion over JSON values.

use serde_json::Value;

/// Compare two values the way heterogeneous map datasets expect.
///
/// Numbers compare numerically, numeric strings compare equal to the numbers they spell,
/// and booleans compare as `0`/`1` against numbers. Everything else compares structurally.
///
/// ```
/// use canopy_records::loose_eq;
/// use serde_json::json;
/// assert!(loose_eq(&json!(12), &json!("12")));
/// assert!(loose_eq(&json!(1.0), &json!(1)));
/// assert!(!loose_eq(&json!("a"), &json!("b")));
/// ```
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(_) | Value::Bool(_), Value::Number(_) | Value::String(_))
        | (Value::String(_), Value::Number(_) | Value::Bool(_))
        | (Value::Number(_), Value::Bool(_)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => a == b,
    }
}

/// Numeric reading of a value: numbers, numeric strings (blank reads as `0`), and booleans.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Coordinate reading: anything non-numeric or non-finite is "no coordinate".
pub(crate) fn coordinate(value: Option<&Value>) -> f64 {
    match value.and_then(as_number) {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Level reading: non-negative integers, possibly spelled as strings.
pub(crate) fn as_level(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|l| u32::try_from(l).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Source text of an id as it appears in the input.
pub(crate) fn raw_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
