//! Data Models
//!
//! This module contains the data structures the binding engine passes around:
//!
//! - `Document` - a store entity with content, properties and page placement
//! - `FieldTypeDeclaration` / `FieldType` - per-field column type declarations
//! - `RowRecord` / `StagingRecord` - table rows derived from documents
//! - `ColumnDescriptor` - per-field render/edit behavior
//!
//! Rows and columns are pure functions of the query result and the schema;
//! they are rebuilt, never patched.

mod column;
mod document;
mod field_type;
mod row;

pub use column::{CellEditor, CellRenderer, ColumnBehavior, ColumnDescriptor, PinSide, RenderedCell};
pub use document::{Document, DocumentFilter, PageRef};
pub use field_type::{FieldKind, FieldSchema, FieldType, FieldTypeDeclaration};
pub use row::{
    RowRecord, RowTarget, StagingRecord, BLOCK_FIELD, BLOCK_TITLE_FIELD, CONTENT_FIELD,
    ID_PROPERTY, PAGE_FIELD,
};
