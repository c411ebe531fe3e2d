//! Row Records
//!
//! `RowRecord` is the ephemeral, per-document table row handed to the grid.
//! Rows are rebuilt from scratch on every query refresh and never patched
//! across refreshes. `StagingRecord` holds the values of the pinned
//! "create new" row until they are promoted into a document.

use crate::models::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Derived display title of a row.
pub const BLOCK_TITLE_FIELD: &str = "blockTitle";
/// Back-reference to the source document (never a column).
pub const BLOCK_FIELD: &str = "block";
/// Page display name.
pub const PAGE_FIELD: &str = "page";
/// Raw document content.
pub const CONTENT_FIELD: &str = "content";
/// Property an explicit self-identifier is stored under.
pub const ID_PROPERTY: &str = "id";

/// One table row derived from exactly one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRecord {
    /// Display title (label > name > title > page name > first line)
    pub block_title: String,

    /// Page display name
    pub page: String,

    /// Raw document content
    pub content: String,

    /// Document properties flattened onto the row
    pub properties: Map<String, Value>,

    /// Source document
    pub block: Document,
}

impl RowRecord {
    /// Identifier of the source document.
    pub fn document_id(&self) -> &str {
        &self.block.id
    }

    /// Cell value for a field. Derived fields shadow same-named properties.
    pub fn get(&self, field: &str) -> Option<Value> {
        match field {
            BLOCK_TITLE_FIELD => Some(Value::String(self.block_title.clone())),
            PAGE_FIELD => Some(Value::String(self.page.clone())),
            CONTENT_FIELD => Some(Value::String(self.content.clone())),
            BLOCK_FIELD => serde_json::to_value(&self.block).ok(),
            _ => self.properties.get(field).cloned(),
        }
    }

    /// Optimistically write a cell value into the in-memory row.
    pub fn set(&mut self, field: &str, value: Value) {
        match field {
            BLOCK_TITLE_FIELD => self.block_title = crate::utils::format_property_value(&value),
            PAGE_FIELD => self.page = crate::utils::format_property_value(&value),
            CONTENT_FIELD => self.content = crate::utils::format_property_value(&value),
            BLOCK_FIELD => {}
            _ => {
                self.properties.insert(field.to_string(), value);
            }
        }
    }

    /// Column-eligible keys of this row, in a stable order.
    ///
    /// The document back-reference is excluded.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.properties.keys().cloned().collect();
        for derived in [BLOCK_TITLE_FIELD, CONTENT_FIELD, PAGE_FIELD] {
            if !keys.iter().any(|k| k == derived) {
                keys.push(derived.to_string());
            }
        }
        keys
    }

    /// Plain mapping for the grid adapter: properties, derived fields and the
    /// `block` back-reference.
    pub fn to_grid_row(&self) -> Map<String, Value> {
        let mut row = self.properties.clone();
        row.insert(
            BLOCK_TITLE_FIELD.to_string(),
            Value::String(self.block_title.clone()),
        );
        if let Ok(block) = serde_json::to_value(&self.block) {
            row.insert(BLOCK_FIELD.to_string(), block);
        }
        row.insert(CONTENT_FIELD.to_string(), Value::String(self.content.clone()));
        row.insert(PAGE_FIELD.to_string(), Value::String(self.page.clone()));
        row
    }
}

/// Which row a cell edit targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RowTarget {
    /// Row backed by an existing document
    #[serde(rename_all = "camelCase")]
    Bound { document_id: String },

    /// The single pinned "create new" row
    Staging,
}

impl RowTarget {
    pub fn bound(document_id: impl Into<String>) -> Self {
        Self::Bound {
            document_id: document_id.into(),
        }
    }

    pub fn is_staging(&self) -> bool {
        matches!(self, RowTarget::Staging)
    }
}

/// In-progress values of the pinned "create new" row.
///
/// Session scoped, never persisted. Keeps insertion order so the promoted
/// document lists properties in the order the user filled them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagingRecord {
    entries: Vec<(String, Value)>,
}

impl StagingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a value; re-staging a field replaces it in place.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        match self.entries.iter_mut().find(|(k, _)| *k == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Staged entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Plain mapping for the pinned grid row.
    pub fn to_grid_row(&self) -> Map<String, Value> {
        self.entries.iter().cloned().collect()
    }
}
