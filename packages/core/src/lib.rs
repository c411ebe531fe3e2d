//! DocGrid Core Binding Engine
//!
//! Presents loosely-typed, property-bearing documents from an external
//! document-graph store as a typed, editable table, and writes table edits
//! back into the store.
//!
//! # Architecture
//!
//! - **Injected store**: every service takes an `Arc<dyn DocumentStore>`; there is no global handle
//! - **Pure rebuilds**: rows and columns are recomputed from (query result, schema) on every refresh
//! - **Closed type table**: each declared field kind maps to exactly one (renderer, editor) pair
//! - **Fire-and-forget writes**: store failures are logged, never fatal
//!
//! # Modules
//!
//! - [`models`] - Documents, field types, rows and column descriptors
//! - [`db`] - Store interface, change events and the in-memory store
//! - [`services`] - The binding pipeline (QueryBinder, SchemaResolver, TableView, etc.)
//! - [`config`] - Engine conventions (hidden fields, declaration prefix, title column)
//! - [`utils`] - Boundary token encodings

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::BindingConfig;
pub use db::{DocumentStore, MemoryStore};
pub use models::*;
pub use services::*;
