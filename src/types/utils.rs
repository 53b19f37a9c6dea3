//! Shared utility functions for model records and text handling.
//!
//! ## JSON Extraction Helpers
//!
//! Provides ergonomic helpers for reading fields out of extracted model records:
//! - `json_string`, `json_string_or` - Extract non-empty strings
//! - `json_string_array` - Extract string arrays
//! - `json_bool`, `json_number`, `json_number_lenient` - Extract primitives
//! - `json_extra` - Collect fields a typed record does not name

use serde_json::{Map, Value};

/// A structured record extracted from model output
pub type Record = Map<String, Value>;

// =============================================================================
// JSON Value Extraction Helpers
// =============================================================================

/// Extract a non-empty, trimmed string from a JSON value by key.
///
/// Numbers are accepted and rendered, since models often answer `"experience": 5`.
#[inline]
pub fn json_string(value: &Record, key: &str) -> Option<String> {
    let text = match value.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Extract string with default value.
#[inline]
pub fn json_string_or(value: &Record, key: &str, default: &str) -> String {
    json_string(value, key).unwrap_or_else(|| default.to_string())
}

/// Extract string array from JSON value by key, skipping blank entries.
#[inline]
pub fn json_string_array(value: &Record, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|s| s.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Extract boolean with default.
///
/// Accepts `"true"`/`"false"` strings as well as JSON booleans.
#[inline]
pub fn json_bool(value: &Record, key: &str, default: bool) -> bool {
    match value.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => true,
            "false" | "no" => false,
            _ => default,
        },
        _ => default,
    }
}

/// Extract a score only when the model produced an actual JSON number.
#[inline]
pub fn json_number(value: &Record, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

/// Extract a number, also accepting numeric strings such as `"7.5"`.
#[inline]
pub fn json_number_lenient(value: &Record, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Fields of `value` not listed in `known`, kept so no model output is lost.
pub fn json_extra(value: &Record, known: &[&str]) -> Record {
    value
        .iter()
        .filter(|(k, _)| !known.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

// =============================================================================
// String Utilities
// =============================================================================

/// Take at most `max_chars` characters, respecting UTF-8 boundaries.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Render a JSON value as a compact one-line string for prompts and logs.
pub fn compact_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_json_string_skips_blank() {
        let v = record(json!({"name": "  Ada ", "grade": "", "years": 5}));
        assert_eq!(json_string(&v, "name").as_deref(), Some("Ada"));
        assert_eq!(json_string(&v, "grade"), None);
        assert_eq!(json_string(&v, "years").as_deref(), Some("5"));
        assert_eq!(json_string_or(&v, "missing", "n/a"), "n/a");
    }

    #[test]
    fn test_json_bool_lenient() {
        let v = record(json!({"a": true, "b": "false", "c": "maybe"}));
        assert!(json_bool(&v, "a", false));
        assert!(!json_bool(&v, "b", true));
        assert!(json_bool(&v, "c", true));
        assert!(json_bool(&v, "missing", true));
    }

    #[test]
    fn test_json_number_is_strict() {
        let v = record(json!({"score": 8, "text": "9"}));
        assert_eq!(json_number(&v, "score"), Some(8.0));
        assert_eq!(json_number(&v, "text"), None);
        assert_eq!(json_number_lenient(&v, "text"), Some(9.0));
    }

    #[test]
    fn test_json_extra_skips_known() {
        let v = record(json!({"notes": "ok", "depth": "good", "score": 3}));
        let extra = json_extra(&v, &["notes", "score"]);
        assert_eq!(extra.len(), 1);
        assert_eq!(extra["depth"], "good");
    }

    #[test]
    fn test_truncate_chars_utf8() {
        assert_eq!(truncate_chars("привет", 3), "при");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
