//! Coercion primitives for loosely-typed input.
//!
//! Every helper reads one field of a JSON object and either keeps the stored
//! value, when it has the expected primitive type, or substitutes a default.
//! None of them fail: a non-object input simply has no fields.

use crate::ids::generate_id;
use crate::types::Tier;
use serde_json::Value;

/// Look up `key` on `v` when `v` is an object.
pub fn field<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    v.as_object().and_then(|o| o.get(key))
}

fn malformed(key: &str, found: &Value) {
    tracing::debug!(field = key, found = %type_name(found), "substituting default for malformed value");
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

pub fn string_or(v: &Value, key: &str, default: &str) -> String {
    match field(v, key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            malformed(key, other);
            default.to_string()
        }
        None => default.to_string(),
    }
}

/// A string field that may be legitimately absent.
pub fn opt_string(v: &Value, key: &str) -> Option<String> {
    match field(v, key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => {
            malformed(key, other);
            None
        }
    }
}

pub fn number_or(v: &Value, key: &str, default: f64) -> f64 {
    match field(v, key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(other) => {
            malformed(key, other);
            default
        }
        None => default,
    }
}

/// A number field that may be legitimately absent.
pub fn opt_number(v: &Value, key: &str) -> Option<f64> {
    match field(v, key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::Null) | None => None,
        Some(other) => {
            malformed(key, other);
            None
        }
    }
}

/// A number in [0, 1]; stored values outside the interval are clamped.
pub fn unit_interval_or(v: &Value, key: &str, default: f64) -> f64 {
    number_or(v, key, default).clamp(0.0, 1.0)
}

/// A non-negative integer. Whole floats are accepted; negative or fractional
/// numbers fall back to `default`.
pub fn count_or(v: &Value, key: &str, default: u32) -> u32 {
    let Some(value) = field(v, key) else {
        return default;
    };
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).unwrap_or(u32::MAX);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => f as u32,
        _ => {
            malformed(key, value);
            default
        }
    }
}

pub fn bool_or(v: &Value, key: &str, default: bool) -> bool {
    match field(v, key) {
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            malformed(key, other);
            default
        }
        None => default,
    }
}

/// A string enum: the stored value must parse exactly, otherwise `default`.
pub fn enum_or<T: Copy>(v: &Value, key: &str, parse: fn(&str) -> Option<T>, default: T) -> T {
    match field(v, key) {
        Some(Value::String(s)) => parse(s).unwrap_or_else(|| {
            tracing::debug!(field = key, value = %s, "unknown enum value, using fallback");
            default
        }),
        Some(other) => {
            malformed(key, other);
            default
        }
        None => default,
    }
}

pub fn tier_or(v: &Value, key: &str, default: Tier) -> Tier {
    enum_or(v, key, Tier::parse, default)
}

/// Keep a present, non-blank string id; otherwise generate one with `prefix`.
pub fn id_or_generate(v: &Value, prefix: &str) -> String {
    match field(v, "id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => generate_id(prefix),
    }
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// A set of tags or references. Non-arrays yield an empty set; non-string and
/// blank elements are dropped and duplicates collapse onto their first occurrence.
pub fn string_list(v: &Value, key: &str) -> Vec<String> {
    let Some(Value::Array(items)) = field(v, key) else {
        return Vec::new();
    };
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if let Value::String(s) = item {
            if !s.trim().is_empty() && !out.contains(s) {
                out.push(s.clone());
            }
        }
    }
    out
}

/// Editable text rows. Arrays keep their string elements (blank rows included);
/// anything else becomes a single blank row so there is always a row to edit.
pub fn text_rows(v: &Value, key: &str) -> Vec<String> {
    match field(v, key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => vec![String::new()],
    }
}

/// Editable entity rows. Arrays map every element through `normalize`;
/// anything else becomes exactly one default row.
pub fn row_list<T>(
    v: &Value,
    key: &str,
    normalize: impl Fn(&Value) -> T,
    default_row: impl FnOnce() -> T,
) -> Vec<T> {
    match field(v, key) {
        Some(Value::Array(items)) => items.iter().map(normalize).collect(),
        _ => vec![default_row()],
    }
}

/// A committed collection on the wizard record: arrays map through
/// `normalize`, anything else is an empty collection.
pub fn collection<T>(v: &Value, key: &str, normalize: impl Fn(&Value) -> T) -> Vec<T> {
    match field(v, key) {
        Some(Value::Array(items)) => items.iter().map(normalize).collect(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
