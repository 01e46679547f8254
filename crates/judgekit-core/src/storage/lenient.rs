//! Field readers for partial JSON records.
//!
//! Persisted blobs can be written by older versions, another open surface,
//! or edited by hand. Every reader here returns the supplied default when
//! the field is missing or has the wrong type.

use serde_json::Value;

/// Integer field. Accepts JSON integers and floats (truncated toward zero).
pub fn int(value: &Value, key: &str, default: i64) -> i64 {
    match value.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(default),
        _ => default,
    }
}

/// Non-negative counter field, clamped into `u32`.
pub fn count(value: &Value, key: &str) -> u32 {
    int(value, key, 0).clamp(0, i64::from(u32::MAX)) as u32
}

/// Optional integer field; `null`, missing, or non-numeric yields `None`.
pub fn opt_int(value: &Value, key: &str) -> Option<i64> {
    match value.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        _ => None,
    }
}

pub fn boolean(value: &Value, key: &str, default: bool) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(default)
}

pub fn string(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Array field; anything else yields an empty slice.
pub fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
