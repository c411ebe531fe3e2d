//! Binding Engine Error Types
//!
//! None of these are fatal. Each degrades a single cell, row, or table view:
//!
//! - `ConfigurationMissing`: no schema record, table falls back to an empty schema
//! - `MalformedDocument`: document silently left out of the rows
//! - `ReferenceUnresolved`: reference cell renders empty
//! - `WriteFailed`: logged; optimistic UI kept, staging row left intact

use thiserror::Error;

/// Binding engine errors
#[derive(Error, Debug)]
pub enum TableError {
    /// No configuration record found for a category
    #[error("No configuration record for category '{category}'")]
    ConfigurationMissing { category: String },

    /// Document lacks content, identifier, or page
    #[error("Malformed document '{id}': missing {missing}")]
    MalformedDocument { id: String, missing: &'static str },

    /// Reference token malformed or its target does not exist
    #[error("Unresolved reference: {token}")]
    ReferenceUnresolved { token: String },

    /// A store mutation was rejected
    #[error("Write failed during {operation}: {source}")]
    WriteFailed {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// A store read failed
    #[error("Store read failed: {0}")]
    ReadFailed(#[source] anyhow::Error),

    /// No row with this document id in the current view
    #[error("Row not found: {document_id}")]
    RowNotFound { document_id: String },

    /// No column for this field in the current view
    #[error("Column not found: {field}")]
    ColumnNotFound { field: String },

    /// Field is not editable on the targeted row
    #[error("Field '{field}' is not editable on this row")]
    NotEditable { field: String },

    /// The staging row has no title to promote
    #[error("Staging row has no title")]
    EmptyStagingTitle,

    /// Editor input could not be turned into a value
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl TableError {
    /// Create a configuration missing error
    pub fn configuration_missing(category: impl Into<String>) -> Self {
        Self::ConfigurationMissing {
            category: category.into(),
        }
    }

    /// Create a reference unresolved error
    pub fn reference_unresolved(token: impl Into<String>) -> Self {
        Self::ReferenceUnresolved {
            token: token.into(),
        }
    }

    /// Create a write failed error
    pub fn write_failed(operation: impl Into<String>, source: anyhow::Error) -> Self {
        Self::WriteFailed {
            operation: operation.into(),
            source,
        }
    }

    /// Create a row not found error
    pub fn row_not_found(document_id: impl Into<String>) -> Self {
        Self::RowNotFound {
            document_id: document_id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
