//! Boundary value encodings
//!
//! Stored documents use a handful of textual tokens that must round-trip
//! exactly for interop with data written by other clients of the store:
//!
//! - reference token: `((identifier))`
//! - page-link token: `[[value]]` (dates and category names)
//! - category membership line: `is:: [[Category]]`
//! - generic property line: `key:: value`
//!
//! Parsing is lenient (surrounding text is ignored, like the host app does),
//! encoding is exact.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// `((identifier))` anywhere in the value; the identifier is the first match.
static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\(([^()]+)\)\)").unwrap());

/// `[[value]]` anywhere in the value.
static PAGE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").unwrap());

/// `key:: value` on its own line. Keys follow the host's property-name rules.
static PROPERTY_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_.\-?]+)::\s?(.*)$").unwrap());

/// Encode a document identifier as a reference token.
///
/// ```
/// use docgrid_core::utils::encode_reference;
///
/// assert_eq!(encode_reference("uuid-1"), "((uuid-1))");
/// ```
pub fn encode_reference(id: &str) -> String {
    format!("(({}))", id)
}

/// Extract the identifier from a reference token.
///
/// Returns `None` for values that carry no well-formed `((...))` token.
pub fn parse_reference(value: &str) -> Option<String> {
    REFERENCE_RE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Wrap a value as a page-link token: `2024-05-01` -> `[[2024-05-01]]`.
pub fn encode_page_link(value: &str) -> String {
    format!("[[{}]]", value)
}

/// Unwrap a page-link token, returning the inner text.
pub fn parse_page_link(value: &str) -> Option<String> {
    PAGE_LINK_RE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Category membership line written into promoted documents.
pub fn category_line(property: &str, category: &str) -> String {
    property_line(property, &encode_page_link(category))
}

/// Generic `key:: value` line.
pub fn property_line(key: &str, value: &str) -> String {
    format!("{}:: {}", key, value)
}

/// Flatten a property value into the text the store would show for it.
///
/// Sequences are joined with `, ` (the host's multi-value separator),
/// `null` becomes the empty string.
pub fn format_property_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(format_property_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Text of a value used for truthiness checks: `None` when absent or empty.
pub fn non_empty_text(value: Option<&Value>) -> Option<String> {
    value
        .map(format_property_value)
        .filter(|s| !s.trim().is_empty())
}

/// Parse a single `key:: value` line.
pub fn parse_property_line(line: &str) -> Option<(String, String)> {
    let caps = PROPERTY_LINE_RE.captures(line.trim_end())?;
    let key = caps.get(1)?.as_str().to_lowercase();
    let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    Some((key, value.to_string()))
}

/// Collect every property line of a document body.
///
/// Values stay raw strings; later lines win over earlier duplicates.
pub fn extract_properties(content: &str) -> Map<String, Value> {
    let mut properties = Map::new();
    for line in content.lines() {
        if let Some((key, value)) = parse_property_line(line) {
            properties.insert(key, Value::String(value));
        }
    }
    properties
}

/// True when every non-blank line of the body is a property line.
pub fn is_properties_only(content: &str) -> bool {
    let mut saw_property = false;
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        if parse_property_line(line).is_none() {
            return false;
        }
        saw_property = true;
    }
    saw_property
}

/// Rewrite (or append) the `key:: value` line of a document body.
pub fn upsert_property_line(content: &str, key: &str, value: &Value) -> String {
    let replacement = property_line(key, &format_property_value(value));
    let mut replaced = false;
    let mut lines: Vec<String> = content
        .lines()
        .map(|line| match parse_property_line(line) {
            Some((existing, _)) if !replaced && existing == key.to_lowercase() => {
                replaced = true;
                replacement.clone()
            }
            _ => line.to_string(),
        })
        .collect();

    if !replaced {
        lines.push(replacement);
    }
    lines.join("\n")
}

/// First line of a document body (text up to the first line break).
pub fn first_line(content: &str) -> &str {
    content.split('\n').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_token_round_trip() {
        let token = encode_reference("6512ab-77");
        assert_eq!(token, "((6512ab-77))");
        assert_eq!(parse_reference(&token), Some("6512ab-77".to_string()));
    }

    #[test]
    fn test_parse_reference_rejects_malformed() {
        assert_eq!(parse_reference("uuid-1"), None);
        assert_eq!(parse_reference("((uuid-1)"), None);
        assert_eq!(parse_reference("(())"), None);
        assert_eq!(parse_reference(""), None);
    }

    #[test]
    fn test_parse_reference_ignores_surrounding_text() {
        assert_eq!(
            parse_reference("see ((abc)) and ((def))"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_page_link() {
        assert_eq!(encode_page_link("2024-05-01"), "[[2024-05-01]]");
        assert_eq!(
            parse_page_link("[[2024-05-01]]"),
            Some("2024-05-01".to_string())
        );
        assert_eq!(parse_page_link("2024-05-01"), None);
    }

    #[test]
    fn test_category_and_property_lines() {
        assert_eq!(category_line("is", "Book"), "is:: [[Book]]");
        assert_eq!(property_line("author", "((uuid-1))"), "author:: ((uuid-1))");
    }

    #[test]
    fn test_format_property_value() {
        assert_eq!(format_property_value(&json!("x")), "x");
        assert_eq!(format_property_value(&json!(42)), "42");
        assert_eq!(format_property_value(&json!(["a", "b"])), "a, b");
        assert_eq!(format_property_value(&Value::Null), "");
    }

    #[test]
    fn test_extract_properties() {
        let props = extract_properties("Book A\nis:: [[Book]]\nAuthor:: ((uuid-1))");
        assert_eq!(props.get("is"), Some(&json!("[[Book]]")));
        assert_eq!(props.get("author"), Some(&json!("((uuid-1))")));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_is_properties_only() {
        assert!(is_properties_only("field.status:: select(Open;Closed)\nicon:: x"));
        assert!(!is_properties_only("Title line\nstatus:: Open"));
        assert!(!is_properties_only(""));
    }

    #[test]
    fn test_upsert_property_line_replaces_and_appends() {
        let body = "Book A\nstatus:: Open";
        assert_eq!(
            upsert_property_line(body, "status", &json!("Closed")),
            "Book A\nstatus:: Closed"
        );
        assert_eq!(
            upsert_property_line(body, "pages", &json!(320)),
            "Book A\nstatus:: Open\npages:: 320"
        );
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("Title\nbody"), "Title");
        assert_eq!(first_line("Only"), "Only");
        assert_eq!(first_line(""), "");
    }
}
