//! Canonicalization of JSON-typed cells
//!
//! Legacy exports encode list columns in several ways: PostgreSQL brace
//! arrays (`{a,b}`), comma-separated text, real JSON, or one of a handful of
//! empty markers. The functions here map all of them onto valid JSON text.
//!
//! Nothing in this module returns an error. Text that cannot be understood
//! collapses to an empty container, because the import step downstream only
//! requires that every JSON cell parses.

use serde_json::{Map, Value};
use std::fmt;

const EMPTY_ARRAY: &str = "[]";
const EMPTY_OBJECT: &str = "{}";

/// Literal cell contents (after trimming) that mean "no items"
const EMPTY_ARRAY_MARKERS: &[&str] = &["{}", "[]", "\"{}\"", "\"[]\"", "null", "NULL"];

/// Semantic kind of a column, assigned by a [`ColumnSchema`](crate::columns::ColumnSchema)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Free text, never touched
    PlainText,
    /// Must hold a JSON array
    JsonArray,
    /// Must hold a JSON object
    JsonObject,
}

impl ColumnKind {
    /// Whether cells of this kind are rewritten by the normalizer
    pub fn is_json(self) -> bool {
        !matches!(self, ColumnKind::PlainText)
    }

    /// The empty container for this kind, or `None` for plain text
    pub fn empty_value(self) -> Option<Value> {
        match self {
            ColumnKind::PlainText => None,
            ColumnKind::JsonArray => Some(Value::Array(Vec::new())),
            ColumnKind::JsonObject => Some(Value::Object(Map::new())),
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::PlainText => "plain text",
            ColumnKind::JsonArray => "JSON array",
            ColumnKind::JsonObject => "JSON object",
        };
        f.write_str(name)
    }
}

/// Normalize one raw cell according to its column kind
///
/// Plain text is returned unchanged. JSON kinds always come back as compact
/// JSON text of the right shape, and feeding the result back in returns it
/// unchanged.
pub fn normalize_cell(raw: &str, kind: ColumnKind) -> String {
    match kind {
        ColumnKind::PlainText => raw.to_string(),
        ColumnKind::JsonArray => normalize_array(raw),
        ColumnKind::JsonObject => normalize_object(raw),
    }
}

/// Canonicalize a cell that must hold a JSON array
pub fn normalize_array(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || EMPTY_ARRAY_MARKERS.contains(&trimmed) {
        return EMPTY_ARRAY.to_string();
    }

    // PostgreSQL array literal: {a,"b c",'d'}
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        let interior = &trimmed[1..trimmed.len() - 1];
        let items = interior
            .split(',')
            .map(|item| strip_quotes(item.trim()))
            .filter(|item| !item.trim().is_empty());
        return string_array(items);
    }

    // After trimming, JSON array text can only begin with `[`, so this branch
    // also covers "already valid JSON that happens to be a list".
    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ Value::Array(_)) => value.to_string(),
            _ => EMPTY_ARRAY.to_string(),
        };
    }

    if trimmed.contains(',') {
        let items = trimmed
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty());
        return string_array(items);
    }

    string_array(std::iter::once(trimmed))
}

/// Canonicalize a cell that must hold a JSON object
///
/// Anything that does not parse as an object becomes `{}`. Valid objects are
/// re-serialized compactly with their key order intact.
pub fn normalize_object(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == EMPTY_OBJECT || !trimmed.starts_with('{') {
        return EMPTY_OBJECT.to_string();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value @ Value::Object(_)) => value.to_string(),
        _ => EMPTY_OBJECT.to_string(),
    }
}

/// Coerce an already-parsed JSON field into the container its kind requires
///
/// Used for JSON exports, where a list column may arrive as a real array, a
/// string in one of the legacy encodings, a bare scalar, or `null`.
pub fn normalize_value(value: Value, kind: ColumnKind) -> Value {
    match (kind, value) {
        (ColumnKind::PlainText, value) => value,

        (ColumnKind::JsonArray, value @ Value::Array(_)) => value,
        (ColumnKind::JsonArray, Value::String(text)) => reparse(&normalize_array(&text), kind),
        (ColumnKind::JsonArray, scalar @ (Value::Number(_) | Value::Bool(_))) => {
            Value::Array(vec![scalar])
        }
        (ColumnKind::JsonArray, _) => Value::Array(Vec::new()),

        (ColumnKind::JsonObject, value @ Value::Object(_)) => value,
        (ColumnKind::JsonObject, Value::String(text)) => {
            reparse(&normalize_object(&text), kind)
        }
        (ColumnKind::JsonObject, _) => Value::Object(Map::new()),
    }
}

fn reparse(canonical: &str, kind: ColumnKind) -> Value {
    serde_json::from_str(canonical)
        .ok()
        .or_else(|| kind.empty_value())
        .unwrap_or(Value::Null)
}

fn string_array<'a>(items: impl Iterator<Item = &'a str>) -> String {
    Value::Array(items.map(|item| Value::String(item.to_string())).collect()).to_string()
}

/// Remove one layer of matching single or double quotes
fn strip_quotes(item: &str) -> &str {
    for quote in ['"', '\''] {
        if item.len() >= 2 && item.starts_with(quote) && item.ends_with(quote) {
            return &item[1..item.len() - 1];
        }
    }
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "{}",
        "[]",
        "\"{}\"",
        "\"[]\"",
        "null",
        "NULL",
        "{Strategy,Family}",
        "{\"War\",\"Card Game\"}",
        "{'Dice', 'Bluffing'}",
        "{ , }",
        "{\"a\":1}",
        "[\"A\",\"B\"]",
        "[ 1, 2.5, true, {\"x\": null} ]",
        "[not json",
        "Uwe Rosenberg, Reiner Knizia",
        "a,,b,",
        "Chess",
        "  Go  ",
        "\"Chess\"",
        "42",
        "{ボードゲーム,カードゲーム}",
        "not an object",
        "{broken",
        "{\"nested\": {\"k\": [1, 2]}, \"b\": \"c\"}",
    ];

    #[test]
    fn test_empty_markers_collapse_to_empty_array() {
        for marker in ["", "  ", "{}", "[]", "\"{}\"", "\"[]\"", "null", "NULL"] {
            assert_eq!(normalize_array(marker), "[]", "marker {:?}", marker);
        }
    }

    #[test]
    fn test_brace_array() {
        assert_eq!(normalize_array("{Strategy,Family}"), r#"["Strategy","Family"]"#);
        assert_eq!(normalize_array(r#"{"War","Card Game"}"#), r#"["War","Card Game"]"#);
        assert_eq!(normalize_array("{'Dice', 'Bluffing'}"), r#"["Dice","Bluffing"]"#);
        assert_eq!(normalize_array("{1,2,3}"), r#"["1","2","3"]"#);
    }

    #[test]
    fn test_brace_array_drops_empty_items() {
        assert_eq!(normalize_array("{ , }"), "[]");
        assert_eq!(normalize_array("{a,,\"\",b}"), r#"["a","b"]"#);
        assert_eq!(normalize_array("{   }"), "[]");
    }

    #[test]
    fn test_brace_array_strips_only_one_quote_layer() {
        assert_eq!(normalize_array(r#"{"'Quoted'"}"#), r#"["'Quoted'"]"#);
        assert_eq!(normalize_array(r#"{"Unbalanced}"#), r#"["\"Unbalanced"]"#);
    }

    #[test]
    fn test_brace_array_keeps_non_ascii() {
        assert_eq!(
            normalize_array("{ボードゲーム,カードゲーム}"),
            r#"["ボードゲーム","カードゲーム"]"#
        );
    }

    #[test]
    fn test_json_array_passthrough() {
        assert_eq!(normalize_array(r#"["A","B"]"#), r#"["A","B"]"#);
        assert_eq!(normalize_array(r#" [ "A" ,  "B" ] "#), r#"["A","B"]"#);
        assert_eq!(
            normalize_array(r#"[1, 2.5, true, {"x": null}]"#),
            r#"[1,2.5,true,{"x":null}]"#
        );
    }

    #[test]
    fn test_malformed_bracket_text_is_discarded() {
        assert_eq!(normalize_array("[not json"), "[]");
        assert_eq!(normalize_array("[1, 2"), "[]");
    }

    #[test]
    fn test_comma_separated_text() {
        assert_eq!(
            normalize_array("Uwe Rosenberg, Reiner Knizia"),
            r#"["Uwe Rosenberg","Reiner Knizia"]"#
        );
        assert_eq!(normalize_array("a,,b,"), r#"["a","b"]"#);
    }

    #[test]
    fn test_single_scalar_wraps() {
        assert_eq!(normalize_array("Chess"), r#"["Chess"]"#);
        assert_eq!(normalize_array("  Go  "), r#"["Go"]"#);
        assert_eq!(normalize_array("42"), r#"["42"]"#);
        assert_eq!(normalize_array("\"Chess\""), r#"["\"Chess\""]"#);
    }

    #[test]
    fn test_object_column() {
        assert_eq!(normalize_object(""), "{}");
        assert_eq!(normalize_object("  {}  "), "{}");
        assert_eq!(normalize_object("not an object"), "{}");
        assert_eq!(normalize_object(r#"{"a":1}"#), r#"{"a":1}"#);
        assert_eq!(normalize_object(r#"{ "b": 2, "a": 1 }"#), r#"{"b":2,"a":1}"#);
    }

    #[test]
    fn test_malformed_object_is_discarded() {
        assert_eq!(normalize_object("{broken"), "{}");
        assert_eq!(normalize_object("{Strategy,Family}"), "{}");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(normalize_cell("  {x} ", ColumnKind::PlainText), "  {x} ");
    }

    #[test]
    fn test_idempotence() {
        for kind in [ColumnKind::PlainText, ColumnKind::JsonArray, ColumnKind::JsonObject] {
            for sample in SAMPLES {
                let once = normalize_cell(sample, kind);
                let twice = normalize_cell(&once, kind);
                assert_eq!(once, twice, "kind {} sample {:?}", kind, sample);
            }
        }
    }

    #[test]
    fn test_output_is_valid_json_of_expected_kind() {
        for sample in SAMPLES {
            let array: Value = serde_json::from_str(&normalize_array(sample)).unwrap();
            assert!(array.is_array(), "sample {:?}", sample);

            let object: Value = serde_json::from_str(&normalize_object(sample)).unwrap();
            assert!(object.is_object(), "sample {:?}", sample);
        }
    }

    #[test]
    fn test_normalize_value_array_kind() {
        let kind = ColumnKind::JsonArray;
        assert_eq!(normalize_value(json!(["a", 1]), kind), json!(["a", 1]));
        assert_eq!(normalize_value(json!("{a,b}"), kind), json!(["a", "b"]));
        assert_eq!(normalize_value(json!("Reiner Knizia"), kind), json!(["Reiner Knizia"]));
        assert_eq!(normalize_value(json!(""), kind), json!([]));
        assert_eq!(normalize_value(Value::Null, kind), json!([]));
        assert_eq!(normalize_value(json!(4), kind), json!([4]));
        assert_eq!(normalize_value(json!({"k": "v"}), kind), json!([]));
    }

    #[test]
    fn test_normalize_value_object_kind() {
        let kind = ColumnKind::JsonObject;
        assert_eq!(normalize_value(json!({"k": "v"}), kind), json!({"k": "v"}));
        assert_eq!(normalize_value(json!("{\"k\": 1}"), kind), json!({"k": 1}));
        assert_eq!(normalize_value(json!("junk"), kind), json!({}));
        assert_eq!(normalize_value(json!([1]), kind), json!({}));
        assert_eq!(normalize_value(Value::Null, kind), json!({}));
    }

    #[test]
    fn test_normalize_value_plain_text() {
        assert_eq!(normalize_value(json!(7), ColumnKind::PlainText), json!(7));
    }
}
