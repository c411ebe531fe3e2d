//! Schema Resolver
//!
//! Each category page carries a configuration record, its "parameter block":
//! the first top-level document of the page. Its `field.`-prefixed properties
//! declare column types:
//!
//! ```text
//! field.status:: select(Open;Closed;Blocked)
//! field.author:: reference(Person)
//! field.pages:: number
//! ```
//!
//! A missing record is not fatal: `resolve_schema` logs and yields an empty
//! schema so the table still renders from observed fields.

use crate::config::BindingConfig;
use crate::db::{DocumentEvent, DocumentStore};
use crate::models::{Document, FieldSchema, FieldTypeDeclaration};
use crate::services::error::{Result, TableError};
use crate::utils::tokens;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Resolves per-category field schemas from configuration records
pub struct SchemaResolver {
    store: Arc<dyn DocumentStore>,
    config: Arc<BindingConfig>,
}

impl SchemaResolver {
    pub fn new(store: Arc<dyn DocumentStore>, config: Arc<BindingConfig>) -> Self {
        Self { store, config }
    }

    /// Locate the category's configuration record.
    pub async fn find_config_document(&self, category: &str) -> Result<Document> {
        let documents = self
            .store
            .get_page_documents(category)
            .await
            .map_err(TableError::ReadFailed)?;

        find_parameter_block(&documents)
            .cloned()
            .ok_or_else(|| TableError::configuration_missing(category))
    }

    /// Resolve the schema, surfacing `ConfigurationMissing`.
    pub async fn try_resolve_schema(&self, category: &str) -> Result<FieldSchema> {
        let config_doc = self.find_config_document(category).await?;
        let properties = self
            .store
            .get_all_properties(&config_doc.id)
            .await
            .map_err(TableError::ReadFailed)?;
        Ok(self.parse_schema(&properties))
    }

    /// Resolve the schema, degrading to an empty one on any failure.
    pub async fn resolve_schema(&self, category: &str) -> FieldSchema {
        match self.try_resolve_schema(category).await {
            Ok(schema) => {
                tracing::debug!(
                    "Resolved {} field declarations for '{}'",
                    schema.len(),
                    category
                );
                schema
            }
            Err(e) => {
                tracing::warn!("Using empty schema for '{}': {}", category, e);
                FieldSchema::new()
            }
        }
    }

    /// Extract declarations from configuration-record properties.
    pub fn parse_schema(&self, properties: &Map<String, Value>) -> FieldSchema {
        parse_declarations(&self.config, properties)
    }

    /// Write a property onto the configuration record (e.g. a declaration).
    pub async fn set_config_property(&self, category: &str, key: &str, value: Value) -> Result<()> {
        let config_doc = self.find_config_document(category).await?;
        self.store
            .upsert_property(&config_doc.id, key, value)
            .await
            .map_err(|e| TableError::write_failed("set_config_property", e))
    }

    /// Follow the configuration record: yields a fresh schema on every change.
    pub async fn watch(&self, category: &str) -> Result<SchemaWatch> {
        // Subscribe before the lookup so no change slips between the two
        let receiver = self.store.subscribe();
        let config_doc = self.find_config_document(category).await?;
        Ok(SchemaWatch {
            document_id: config_doc.id,
            receiver,
            config: Arc::clone(&self.config),
        })
    }
}

fn parse_declarations(config: &BindingConfig, properties: &Map<String, Value>) -> FieldSchema {
    properties
        .iter()
        .filter_map(|(key, value)| {
            let field = config.declared_field(key)?;
            let raw = tokens::format_property_value(value);
            Some((field.to_string(), FieldTypeDeclaration::parse(&raw)))
        })
        .collect()
}

/// The first top-level document of a page (its left sibling is the page).
///
/// Falls back to the first document parented directly by the page when the
/// store does not report sibling links.
fn find_parameter_block(documents: &[Document]) -> Option<&Document> {
    documents
        .iter()
        .find(|doc| match (&doc.page, &doc.left_id) {
            (Some(page), Some(left)) => *left == page.id,
            _ => false,
        })
        .or_else(|| {
            documents.iter().find(|doc| match (&doc.page, &doc.parent_id) {
                (Some(page), Some(parent)) => *parent == page.id,
                _ => false,
            })
        })
}

/// Live view of a category's schema
pub struct SchemaWatch {
    document_id: String,
    receiver: broadcast::Receiver<DocumentEvent>,
    config: Arc<BindingConfig>,
}

impl SchemaWatch {
    /// Identifier of the configuration record being followed.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Wait for the next change to the configuration record.
    ///
    /// Returns `None` once the store stops publishing events.
    pub async fn next(&mut self) -> Option<FieldSchema> {
        loop {
            match self.receiver.recv().await {
                Ok(DocumentEvent::PropertyChanged {
                    document_id,
                    properties,
                }) if document_id == self.document_id => {
                    return Some(parse_declarations(&self.config, &properties));
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "Schema watch for {} lagged, skipped {} events",
                        self.document_id,
                        skipped
                    );
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
