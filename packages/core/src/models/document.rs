//! Document Data Structures
//!
//! A `Document` is the unit of persistence in the external document-graph
//! store: free-text content, a bag of loosely-typed properties, and its place
//! on a page. This crate only ever reads documents and asks the store to
//! mutate them; it never edits one in place.
//!
//! # Examples
//!
//! ```rust
//! use docgrid_core::models::{Document, PageRef};
//! use serde_json::json;
//!
//! let doc = Document::new(
//!     "Dune\nis:: [[Book]]",
//!     json!({ "is": "[[Book]]" }),
//!     Some(PageRef::new("page-1", "book")),
//! );
//! assert_eq!(doc.category_tags("is"), vec!["Book".to_string()]);
//! ```

use crate::utils::tokens;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Reference to the page a document lives on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    /// Page identifier
    pub id: String,

    /// Normalized (lowercase) page name
    pub name: String,

    /// Page name as the user typed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

impl PageRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            name: name.to_lowercase(),
            original_name: Some(name),
        }
    }
}

/// A document as returned by the store.
///
/// Every field defaults when missing so that loosely-shaped store payloads
/// still deserialize; structural validity is decided later by the record
/// normalizer, not here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier (empty when the store did not supply one)
    #[serde(default, alias = "uuid")]
    pub id: String,

    /// Raw text content, including any `key:: value` property lines
    #[serde(default)]
    pub content: String,

    /// Property name -> value (scalars, sequences, or reference tokens)
    #[serde(default)]
    pub properties: Map<String, Value>,

    /// Page this document belongs to
    #[serde(default)]
    pub page: Option<PageRef>,

    /// Parent document or page identifier
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Left sibling (or the parent itself for a first child)
    #[serde(default)]
    pub left_id: Option<String>,

    /// True when this is the page's leading properties block
    #[serde(default, rename = "preBlock?", alias = "preBlock")]
    pub pre_block: bool,
}

impl Document {
    /// Create a document with a fresh UUID.
    ///
    /// `properties` is expected to be a JSON object; anything else yields an
    /// empty property map.
    pub fn new(content: impl Into<String>, properties: Value, page: Option<PageRef>) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), content, properties, page)
    }

    /// Create a document with an explicit identifier.
    pub fn new_with_id(
        id: impl Into<String>,
        content: impl Into<String>,
        properties: Value,
        page: Option<PageRef>,
    ) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let parent_id = page.as_ref().map(|p| p.id.clone());
        Self {
            id: id.into(),
            content: content.into(),
            properties,
            parent_id,
            left_id: None,
            page,
            pre_block: false,
        }
    }

    /// Mark the document as its page's leading block.
    pub fn as_pre_block(mut self) -> Self {
        self.pre_block = true;
        self
    }

    /// Property value by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Page name, if the document is on a page.
    pub fn page_name(&self) -> Option<&str> {
        self.page.as_ref().map(|p| p.name.as_str())
    }

    /// Every category tag carried in `property`.
    ///
    /// Accepts a scalar or a sequence, with or without `[[...]]` wrapping, so
    /// `"Book"`, `"[[Book]]"`, `["Book", "Novel"]` and
    /// `"[[Book]], [[Novel]]"` all work.
    pub fn category_tags(&self, property: &str) -> Vec<String> {
        let mut tags = Vec::new();
        match self.properties.get(property) {
            Some(Value::Array(items)) => {
                for item in items {
                    push_tags(&tokens::format_property_value(item), &mut tags);
                }
            }
            Some(value) => push_tags(&tokens::format_property_value(value), &mut tags),
            None => {}
        }
        tags
    }
}

fn push_tags(raw: &str, tags: &mut Vec<String>) {
    for part in raw.split(',') {
        let part = part.trim();
        let tag = tokens::parse_page_link(part).unwrap_or_else(|| part.to_string());
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
}

/// Filter expression understood by the store's query capability.
///
/// `Display` renders the host's query DSL so filters can be logged verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentFilter {
    /// `(property name)`: every document carrying the property
    HasProperty { name: String },

    /// `(property name "value")`: documents whose property holds the value
    PropertyEquals { name: String, value: String },
}

impl DocumentFilter {
    /// All documents tagged with `category` through `property`.
    pub fn tagged(property: impl Into<String>, category: impl Into<String>) -> Self {
        Self::PropertyEquals {
            name: property.into(),
            value: category.into(),
        }
    }

    /// Whether a document satisfies this filter.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            DocumentFilter::HasProperty { name } => document
                .properties
                .get(name)
                .map(|v| !v.is_null())
                .unwrap_or(false),
            DocumentFilter::PropertyEquals { name, value } => document
                .category_tags(name)
                .iter()
                .any(|tag| tag.eq_ignore_ascii_case(value)),
        }
    }
}

impl fmt::Display for DocumentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFilter::HasProperty { name } => write!(f, "(property {})", name),
            DocumentFilter::PropertyEquals { name, value } => {
                write!(f, "(property {} \"{}\")", name, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(props: Value) -> Document {
        Document::new("x", props, Some(PageRef::new("p", "Page")))
    }

    #[test]
    fn test_category_tags_shapes() {
        assert_eq!(doc(json!({"is": "Book"})).category_tags("is"), vec!["Book"]);
        assert_eq!(doc(json!({"is": "[[Book]]"})).category_tags("is"), vec!["Book"]);
        assert_eq!(
            doc(json!({"is": ["Book", "Novel"]})).category_tags("is"),
            vec!["Book", "Novel"]
        );
        assert_eq!(
            doc(json!({"is": "[[Book]], [[Novel]]"})).category_tags("is"),
            vec!["Book", "Novel"]
        );
        assert!(doc(json!({})).category_tags("is").is_empty());
    }

    #[test]
    fn test_filter_matches() {
        let book = doc(json!({"is": "[[Book]]"}));
        let plain = doc(json!({"status": "Open"}));

        assert!(DocumentFilter::tagged("is", "Book").matches(&book));
        assert!(DocumentFilter::tagged("is", "book").matches(&book));
        assert!(!DocumentFilter::tagged("is", "Person").matches(&book));
        assert!(DocumentFilter::HasProperty { name: "is".into() }.matches(&book));
        assert!(!DocumentFilter::HasProperty { name: "is".into() }.matches(&plain));
    }

    #[test]
    fn test_filter_display_renders_query_dsl() {
        assert_eq!(
            DocumentFilter::tagged("is", "Book").to_string(),
            "(property is \"Book\")"
        );
        assert_eq!(
            DocumentFilter::HasProperty { name: "is".into() }.to_string(),
            "(property is)"
        );
    }

    #[test]
    fn test_loose_payload_deserializes() {
        let raw = json!({
            "uuid": "abc",
            "content": "Hello",
            "preBlock?": true,
            "page": { "id": "p1", "name": "book" }
        });
        let doc: Document = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.id, "abc");
        assert!(doc.pre_block);
        assert_eq!(doc.page_name(), Some("book"));
        assert!(doc.properties.is_empty());

        let empty: Document = serde_json::from_value(json!({})).unwrap();
        assert!(empty.id.is_empty());
        assert!(empty.page.is_none());
    }
}
