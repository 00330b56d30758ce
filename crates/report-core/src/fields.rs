//! Permissive field access over diagnostics documents.
//!
//! Diagnostics dumps differ between cluster versions and are frequently
//! partial. Every metric extraction goes through these helpers so that a
//! missing intermediate object, a `null`, or a value of the wrong type all
//! resolve to the same typed default instead of an error.

use serde_json::{Map, Value};

/// Walk `path` from `value`, one object key per segment.
///
/// Returns `None` as soon as a segment is missing or the current value is not
/// an object.
///
/// # Examples
///
/// ```
/// use report_core::fields::lookup;
/// use serde_json::json;
///
/// let doc = json!({"os": {"cpu": {"percent": 12}}});
/// assert_eq!(lookup(&doc, &["os", "cpu", "percent"]), Some(&json!(12)));
/// assert_eq!(lookup(&doc, &["os", "mem", "total_in_bytes"]), None);
/// ```
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .filter(|found| !found.is_null())
}

/// Unsigned integer at `path`, or `0`.
///
/// Float values are truncated; negative or non-numeric values yield `0`.
pub fn u64_at(value: &Value, path: &[&str]) -> u64 {
    lookup(value, path)
        .and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        })
        .unwrap_or(0)
}

/// Signed integer at `path`, or `0`. Float values are truncated.
pub fn i64_at(value: &Value, path: &[&str]) -> i64 {
    lookup(value, path)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}

/// Floating-point number at `path`, or `0.0`.
pub fn f64_at(value: &Value, path: &[&str]) -> f64 {
    lookup(value, path).and_then(Value::as_f64).unwrap_or(0.0)
}

/// String at `path`, if present and actually a string.
pub fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path).and_then(Value::as_str)
}

/// Object at `path`, if present and actually an object.
pub fn object_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Map<String, Value>> {
    lookup(value, path).and_then(Value::as_object)
}

/// Array at `path`, if present and actually an array.
pub fn array_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    lookup(value, path).and_then(Value::as_array)
}

/// All string elements of the array at `path`; non-string elements are skipped.
pub fn string_list_at<'a>(value: &'a Value, path: &[&str]) -> Vec<&'a str> {
    array_at(value, path)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
