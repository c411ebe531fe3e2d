//! Binding Services
//!
//! The pipeline from store documents to an editable table:
//!
//! - `QueryBinder` - latest result set of a category query
//! - `SchemaResolver` - field declarations from the category's configuration record
//! - `RecordNormalizer` - documents to rows, title derivation
//! - `ColumnBuilder` - rows + schema to column descriptors
//! - `ReferenceResolver` - `((id))` tokens to target titles
//! - `EditCoordinator` - cell commits, staging row, promotion and deletion
//! - `TableView` - all of the above for one category
//!
//! Every service receives its store handle explicitly.

pub mod category_catalog;
pub mod column_builder;
pub mod edit_coordinator;
pub mod editor_session;
pub mod error;
pub mod query_binder;
pub mod record_normalizer;
pub mod reference_resolver;
pub mod schema_resolver;
pub mod table_view;

pub use category_catalog::CategoryCatalog;
pub use column_builder::ColumnBuilder;
pub use edit_coordinator::{ActiveEdit, CommitOutcome, EditCoordinator};
pub use editor_session::{
    ChoiceSession, DateSession, EditorOption, EditorSession, NumberSession, ReferenceSession,
    TextSession,
};
pub use error::TableError;
pub use query_binder::QueryBinder;
pub use record_normalizer::{derive_title, RecordNormalizer};
pub use reference_resolver::ReferenceResolver;
pub use schema_resolver::{SchemaResolver, SchemaWatch};
pub use table_view::TableView;
