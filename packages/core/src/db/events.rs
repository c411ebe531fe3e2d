//! Document Change Events
//!
//! Stores broadcast a `DocumentEvent` after every successful mutation. The
//! binding engine only subscribes on the configuration-record path (live
//! schema updates); tables themselves stay pull-based.
//!
//! Events are emitted using tokio's broadcast channel, so any number of
//! subscribers receive them asynchronously and slow subscribers lag rather
//! than block the store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Domain events emitted by a `DocumentStore`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentEvent {
    /// A property was upserted; carries the document's full property map
    #[serde(rename_all = "camelCase")]
    PropertyChanged {
        document_id: String,
        properties: Map<String, Value>,
    },

    /// A document was appended to a page
    #[serde(rename_all = "camelCase")]
    DocumentAppended {
        document_id: String,
        page_name: String,
    },

    /// A single document was removed
    #[serde(rename_all = "camelCase")]
    DocumentRemoved { document_id: String },

    /// A whole page (and every document on it) was removed
    #[serde(rename_all = "camelCase")]
    PageRemoved { page_name: String },
}

impl DocumentEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            DocumentEvent::PropertyChanged { .. } => "property:changed",
            DocumentEvent::DocumentAppended { .. } => "document:appended",
            DocumentEvent::DocumentRemoved { .. } => "document:removed",
            DocumentEvent::PageRemoved { .. } => "page:removed",
        }
    }

    /// Document this event concerns, if it concerns a single document.
    pub fn document_id(&self) -> Option<&str> {
        match self {
            DocumentEvent::PropertyChanged { document_id, .. }
            | DocumentEvent::DocumentAppended { document_id, .. }
            | DocumentEvent::DocumentRemoved { document_id } => Some(document_id),
            DocumentEvent::PageRemoved { .. } => None,
        }
    }
}
