//! DocumentStore Trait - Store Client Abstraction
//!
//! This module defines the `DocumentStore` trait: the narrow capability
//! contract the binding engine consumes from the external document-graph
//! store. Every component that talks to the store receives an
//! `Arc<dyn DocumentStore>` explicitly; there is no ambient global handle, so
//! tests substitute `MemoryStore`.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: every store call is a suspension point; callers never
//!    block on the store.
//! 2. **Fire-and-forget writes**: mutations return a plain ack. The store is
//!    the single source of truth; no conflict resolution happens here.
//! 3. **Error Handling**: uses `anyhow::Result`; implementations attach a
//!    `StoreError` where a specific cause exists.
//!
//! # Examples
//!
//! ```rust,no_run
//! use docgrid_core::db::{DocumentStore, MemoryStore};
//! use docgrid_core::models::DocumentFilter;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
//!     store.append_document("Book", "Dune\nis:: [[Book]]").await?;
//!
//!     let books = store.query(&DocumentFilter::tagged("is", "Book")).await?;
//!     assert_eq!(books.len(), 1);
//!     Ok(())
//! }
//! ```

use crate::db::DocumentEvent;
use crate::models::{Document, DocumentFilter};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

/// Capability contract of the external document-graph store
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so handles can be shared between
/// the components of a table and moved into spawned refetch tasks.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    //
    // READS
    //

    /// Run a filter query.
    ///
    /// Returns every matching document; order is store-defined.
    async fn query(&self, filter: &DocumentFilter) -> Result<Vec<Document>>;

    /// Get a document by identifier.
    ///
    /// - `Ok(Some(doc))` if it exists
    /// - `Ok(None)` if it doesn't (not an error)
    async fn get_document(&self, id: &str) -> Result<Option<Document>>;

    /// Get a single property of a document.
    async fn get_property(&self, id: &str, name: &str) -> Result<Option<Value>>;

    /// Get every property of a document.
    ///
    /// Returns an error if the document does not exist.
    async fn get_all_properties(&self, id: &str) -> Result<Map<String, Value>>;

    /// Documents on a page, in page order (first block first).
    ///
    /// Returns an empty list for unknown pages.
    async fn get_page_documents(&self, page_name: &str) -> Result<Vec<Document>>;

    //
    // WRITES
    //

    /// Insert or replace a property on a document.
    async fn upsert_property(&self, id: &str, name: &str, value: Value) -> Result<()>;

    /// Append a new document to the end of a page.
    ///
    /// `content` may carry `key:: value` property lines; the store parses
    /// them into properties. Returns the created document.
    async fn append_document(&self, page_name: &str, content: &str) -> Result<Document>;

    /// Remove a single document.
    async fn remove_document(&self, id: &str) -> Result<()>;

    /// Remove a page and every document on it.
    async fn remove_page(&self, page_name: &str) -> Result<()>;

    //
    // NOTIFICATIONS
    //

    /// Subscribe to change events (used for property-change notifications).
    fn subscribe(&self) -> broadcast::Receiver<DocumentEvent>;
}
