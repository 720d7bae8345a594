//! Lenient field access on raw JSON payloads.
//!
//! Browser traffic is not always well-formed. Every getter falls back to a
//! default instead of failing so a bad field degrades one record, never the
//! stream.

use serde_json::Value;

static NULL: Value = Value::Null;

/// Gets a string field, or empty string.
#[inline]
pub(crate) fn string(value: &Value, key: &str) -> String {
    string_or(value, key, "")
}

/// Gets a string field with default.
#[inline]
pub(crate) fn string_or(value: &Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Gets an optional string field.
#[inline]
pub(crate) fn opt_string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Gets an optional non-empty string field.
#[inline]
pub(crate) fn non_empty_string(value: &Value, key: &str) -> Option<String> {
    opt_string(value, key).filter(|s| !s.is_empty())
}

/// Gets an integer field, or zero. Floats are truncated.
#[inline]
pub(crate) fn u32(value: &Value, key: &str) -> u32 {
    opt_i64(value, key)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default()
}

/// Gets an optional signed integer field. Floats are truncated.
#[inline]
pub(crate) fn opt_i64(value: &Value, key: &str) -> Option<i64> {
    let field = value.get(key)?;
    field
        .as_i64()
        .or_else(|| field.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Gets an optional HTTP status field.
#[inline]
pub(crate) fn opt_status(value: &Value, key: &str) -> Option<u16> {
    opt_i64(value, key).and_then(|n| u16::try_from(n).ok())
}

/// Gets an optional float field.
#[inline]
pub(crate) fn opt_f64(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

/// Gets a boolean field, or false.
#[inline]
pub(crate) fn bool(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or_default()
}

/// Gets an object field, or `Null` when absent or not an object.
#[inline]
pub(crate) fn object<'a>(value: &'a Value, key: &str) -> &'a Value {
    match value.get(key) {
        Some(field @ Value::Object(_)) => field,
        _ => &NULL,
    }
}

/// Gets an array field, or an empty slice.
#[inline]
pub(crate) fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
