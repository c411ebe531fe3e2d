//! Store Error Types
//!
//! Errors raised by `DocumentStore` implementations. The trait itself speaks
//! `anyhow::Result`, so these are the concrete causes implementations attach
//! and callers may downcast to.

use thiserror::Error;

/// Document store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Document not found by ID
    #[error("Document not found: {id}")]
    DocumentNotFound { id: String },

    /// Page not found by name
    #[error("Page not found: {name}")]
    PageNotFound { name: String },

    /// The store refused a mutation
    #[error("Write rejected: {context}")]
    WriteRejected { context: String },
}

impl StoreError {
    /// Create a document not found error
    pub fn document_not_found(id: impl Into<String>) -> Self {
        Self::DocumentNotFound { id: id.into() }
    }

    /// Create a page not found error
    pub fn page_not_found(name: impl Into<String>) -> Self {
        Self::PageNotFound { name: name.into() }
    }

    /// Create a write rejected error
    pub fn write_rejected(context: impl Into<String>) -> Self {
        Self::WriteRejected {
            context: context.into(),
        }
    }
}
