//! Store Layer
//!
//! This module holds everything that touches the external document-graph
//! store:
//!
//! - `DocumentStore` - the injected store-client capability contract
//! - `DocumentEvent` - change notifications broadcast by stores
//! - `MemoryStore` - in-memory implementation for tests and tooling
//!
//! The binding engine never owns documents; it asks the store to read and
//! mutate them and rebuilds its view from query results.

mod document_store;
mod error;
pub mod events;
mod memory_store;

pub use document_store::DocumentStore;
pub use error::StoreError;
pub use events::DocumentEvent;
pub use memory_store::MemoryStore;
