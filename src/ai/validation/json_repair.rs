//! Structured-Response Extraction and JSON Repair
//!
//! Turns raw model text into a structured record. Extraction is total: it
//! never fails, it falls back to a sentinel record `{"raw_response": <text>}`
//! that call sites must check with [`is_unparsed`] before trusting fields.
//!
//! Handles common LLM JSON output issues:
//! - Markdown code fence wrapping (```json ... ```)
//! - JSON embedded in explanatory text
//! - Line comments (`// ...`)
//! - Trailing commas before `}` or `]`

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::constants::context::LOG_PREVIEW_CHARS;
use crate::types::utils::{Record, truncate_chars};

/// Sentinel key marking a record the extractor could not parse
pub const RAW_RESPONSE_KEY: &str = "raw_response";

static FENCE_OPEN_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```json\s*").expect("valid regex"));
static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```\s*").expect("valid regex"));
static FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)```\s*$").expect("valid regex"));
static FENCE_ANY_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*").expect("valid regex"));
static FENCE_ANY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```\s*").expect("valid regex"));

// =============================================================================
// Convenience Functions
// =============================================================================

/// Extract a structured record from an LLM response.
///
/// This is the primary entry point for parsing model output. Always returns a
/// record; unparseable text yields the `raw_response` sentinel.
pub fn extract_record(content: &str) -> Record {
    JsonRepairer::new().extract(content)
}

/// Brace-scan extraction used as a second chance on text the first pass rejected.
///
/// Slices from the first `{` to the last `}`, drops any fence markers inside the
/// slice, and parses (with repair). Returns `None` when no record can be recovered.
pub fn extract_braced_record(content: &str) -> Option<Record> {
    let sliced = brace_slice(content)?;
    let without_fences = FENCE_ANY_JSON.replace_all(sliced, "");
    let without_fences = FENCE_ANY.replace_all(&without_fences, "");
    JsonRepairer::new().parse_or_repair(without_fences.trim())
}

/// Whether a record is the unparsed sentinel
pub fn is_unparsed(record: &Record) -> bool {
    record.contains_key(RAW_RESPONSE_KEY)
}

/// Original model text carried by a sentinel record
pub fn raw_response(record: &Record) -> Option<&str> {
    record.get(RAW_RESPONSE_KEY).and_then(Value::as_str)
}

/// Build the sentinel record for `content`
pub fn unparsed_record(content: &str) -> Record {
    let mut record = Record::new();
    record.insert(
        RAW_RESPONSE_KEY.to_string(),
        Value::String(content.to_string()),
    );
    record
}

// =============================================================================
// JsonRepairer
// =============================================================================

/// Locates, cleans, and repairs the structured part of model output
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRepairer;

impl JsonRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Extract a record, falling back to the sentinel
    pub fn extract(&self, content: &str) -> Record {
        let candidate = self.locate(content);

        if candidate.is_empty() {
            debug!("No structured candidate found in model output");
            return unparsed_record(content);
        }

        let parsed = self
            .parse_or_repair(&candidate)
            .or_else(|| brace_slice(&candidate).and_then(|sliced| self.parse_or_repair(sliced)))
            .or_else(|| self.parse_leading(&candidate));

        match parsed {
            Some(record) => record,
            None => {
                warn!(
                    "Could not parse structured record, keeping raw text: {}",
                    truncate_chars(content, LOG_PREVIEW_CHARS)
                );
                unparsed_record(content)
            }
        }
    }

    /// Strict parse, then one repair pass
    pub fn parse_or_repair(&self, candidate: &str) -> Option<Record> {
        if let Some(record) = parse_object(candidate) {
            return Some(record);
        }

        debug!("Initial JSON parse failed, attempting repair");
        let repaired = self.repair(candidate);
        let record = parse_object(&repaired)?;
        debug!("JSON repaired");
        Some(record)
    }

    /// First complete object at the start of `candidate`, ignoring what follows
    fn parse_leading(&self, candidate: &str) -> Option<Record> {
        let repaired = self.repair(candidate);
        let mut values = serde_json::Deserializer::from_str(&repaired).into_iter::<Value>();
        match values.next()? {
            Ok(Value::Object(record)) => Some(record),
            _ => None,
        }
    }

    /// Find the structured candidate inside raw output
    fn locate(&self, content: &str) -> String {
        let mut candidate = fenced_interior(content)
            .unwrap_or(content)
            .trim()
            .to_string();

        if !candidate.starts_with('{')
            && let Some(sliced) = brace_slice(content)
        {
            candidate = sliced.to_string();
        }

        self.strip_fence_lines(&candidate)
    }

    /// Remove residual fence markers line by line
    fn strip_fence_lines(&self, s: &str) -> String {
        let s = FENCE_OPEN_JSON.replace_all(s.trim(), "");
        let s = FENCE_OPEN.replace_all(&s, "");
        let s = FENCE_CLOSE.replace_all(&s, "");
        s.trim().to_string()
    }

    /// Repair pass: drop line comments and trailing commas
    fn repair(&self, s: &str) -> String {
        let result = self.strip_line_comments(s);
        self.fix_trailing_commas(&result)
    }

    /// Remove `// ...` comments outside of string literals
    fn strip_line_comments(&self, s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let chars: Vec<char> = s.chars().collect();
        let mut in_string = false;
        let mut escape = false;

        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];

            if escape {
                escape = false;
                result.push(ch);
                i += 1;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '/' if !in_string && chars.get(i + 1) == Some(&'/') => {
                    while i < chars.len() && chars[i] != '\n' {
                        i += 1;
                    }
                    continue;
                }
                _ => {}
            }

            result.push(ch);
            i += 1;
        }

        result
    }

    /// Fix trailing commas before ] or }
    fn fix_trailing_commas(&self, s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let chars: Vec<char> = s.chars().collect();
        let mut in_string = false;
        let mut escape = false;

        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];

            if escape {
                escape = false;
                result.push(ch);
                i += 1;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                ',' if !in_string => {
                    // Look ahead, skipping whitespace
                    let mut j = i + 1;
                    while j < chars.len() && chars[j].is_whitespace() {
                        j += 1;
                    }

                    if j < chars.len() && (chars[j] == ']' || chars[j] == '}') {
                        i += 1;
                        continue;
                    }
                }
                _ => {}
            }

            result.push(ch);
            i += 1;
        }

        result
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_object(s: &str) -> Option<Record> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(record)) => Some(record),
        _ => None,
    }
}

/// Interior of a ```json fence, else of the first fence of any kind
fn fenced_interior(content: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets aligned with `content`
    let lower = content.to_ascii_lowercase();

    let start = match lower.find("```json") {
        Some(pos) => pos + "```json".len(),
        None => lower.find("```")? + "```".len(),
    };

    let rest = &content[start..];
    let end = rest.find("```").unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Inclusive slice from the first `{` to the last `}`
fn brace_slice(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn clean(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_valid_json() {
        let record = extract_record(r#"{"approved": true}"#);
        assert_eq!(record, clean(json!({"approved": true})));
    }

    #[test]
    fn test_strip_json_fence() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_record(input), clean(json!({"key": "value"})));
    }

    #[test]
    fn test_unlabeled_fence_with_prose() {
        let input = "Here you go:\n```\n{\"key\": 1}\n```\nLet me know!";
        assert_eq!(extract_record(input), clean(json!({"key": 1})));
    }

    #[test]
    fn test_labeled_fence_with_other_language() {
        let input = "```python\nprint(1)\n```\n{\"score\": 7}";
        assert_eq!(extract_record(input), clean(json!({"score": 7})));
    }

    #[test]
    fn test_extract_from_mixed() {
        let input = r#"Sure! Here's the analysis:
{"technical_accuracy": 8, "notes": "solid"}
Hope this helps!"#;
        let record = extract_record(input);
        assert_eq!(record["technical_accuracy"], 8);
        assert!(!is_unparsed(&record));
    }

    #[test]
    fn test_record_followed_by_prose() {
        let record = extract_record("{\"a\": 1}\nHope this helps!");
        assert_eq!(record, clean(json!({"a": 1})));

        let record = extract_record("{} a");
        assert!(!is_unparsed(&record));
        assert!(record.is_empty());
    }

    #[test]
    fn test_record_followed_by_braced_aside() {
        let input = "{\"grade\": \"junior\"}\n(note: {not json})";
        assert_eq!(extract_record(input), clean(json!({"grade": "junior"})));
    }

    #[test]
    fn test_fix_trailing_comma() {
        let input = r#"{"issues": ["a", "b",], "warning": true,}"#;
        let record = extract_record(input);
        assert_eq!(record, clean(json!({"issues": ["a", "b"], "warning": true})));
    }

    #[test]
    fn test_strip_line_comments() {
        let input = "{\n  \"grade\": \"middle\", // inferred\n  \"url\": \"https://example.com\"\n}";
        let record = extract_record(input);
        assert_eq!(record["grade"], "middle");
        assert_eq!(record["url"], "https://example.com");
    }

    #[test]
    fn test_trailing_comma_inside_string_is_kept() {
        let input = r#"{"notes": "a, }", "x": 1,}"#;
        let record = extract_record(input);
        assert_eq!(record["notes"], "a, }");
    }

    #[test]
    fn test_prose_becomes_sentinel() {
        let input = "I think the candidate did well overall.";
        let record = extract_record(input);
        assert!(is_unparsed(&record));
        assert_eq!(raw_response(&record), Some(input));
    }

    #[test]
    fn test_non_object_becomes_sentinel() {
        assert!(is_unparsed(&extract_record("[1, 2, 3]")));
        assert!(is_unparsed(&extract_record("")));
    }

    #[test]
    fn test_braced_second_chance() {
        let raw = "Report:\n```json\n{\"decision\": {\"grade\": \"Middle\"}}\n```";
        let record = extract_braced_record(raw).unwrap();
        assert_eq!(record["decision"]["grade"], "Middle");
        assert!(extract_braced_record("no braces here").is_none());
    }

    fn simple_object() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<i32>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
        ];
        prop::collection::btree_map("[a-z_]{1,10}", leaf, 0..6)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn prop_fenced_equals_clean(obj in simple_object()) {
            let text = serde_json::to_string(&obj).unwrap();
            let fenced = format!("```json\n{}\n```", text);
            prop_assert_eq!(Value::Object(extract_record(&fenced)), obj);
        }

        #[test]
        fn prop_prose_wrapped_equals_clean(
            obj in simple_object(),
            before in "[a-zA-Z ,.!]{0,30}",
            after in "[a-zA-Z ,.!]{0,30}",
        ) {
            let text = serde_json::to_string(&obj).unwrap();
            let wrapped = format!("{} {} {}", before, text, after);
            prop_assert_eq!(Value::Object(extract_record(&wrapped)), obj);
        }

        #[test]
        fn prop_trailing_comma_equals_clean(obj in simple_object()) {
            let text = serde_json::to_string(&obj).unwrap();
            let with_comma = format!("{},}}", &text[..text.len() - 1]);
            prop_assert_eq!(Value::Object(extract_record(&with_comma)), obj);
        }

        #[test]
        fn prop_unparseable_yields_sentinel(text in "[a-zA-Z ,.!?]{0,60}") {
            let record = extract_record(&text);
            prop_assert!(is_unparsed(&record));
        }
    }
}
