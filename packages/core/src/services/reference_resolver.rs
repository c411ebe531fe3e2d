//! Cross-Reference Resolver
//!
//! Resolves `((identifier))` cell values to their target documents and
//! titles. Lookups are memoized per identifier until `clear` (a re-mount of
//! the table), misses included.

use crate::db::DocumentStore;
use crate::models::{Document, RenderedCell};
use crate::services::error::{Result, TableError};
use crate::services::record_normalizer::derive_title;
use crate::utils::tokens;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Memoizing resolver for reference tokens
pub struct ReferenceResolver {
    store: Arc<dyn DocumentStore>,
    cache: Mutex<HashMap<String, Option<Document>>>,
}

impl ReferenceResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a token, surfacing `ReferenceUnresolved`.
    pub async fn try_resolve(&self, token: &str) -> Result<Document> {
        let id = tokens::parse_reference(token)
            .ok_or_else(|| TableError::reference_unresolved(token))?;

        if let Some(cached) = self.cache.lock().await.get(&id) {
            return cached
                .clone()
                .ok_or_else(|| TableError::reference_unresolved(token));
        }

        let document = self
            .store
            .get_document(&id)
            .await
            .map_err(TableError::ReadFailed)?;
        self.cache.lock().await.insert(id, document.clone());

        document.ok_or_else(|| TableError::reference_unresolved(token))
    }

    /// Target document of a token, or `None` when it cannot be resolved.
    pub async fn resolve_reference(&self, token: &str) -> Option<Document> {
        match self.try_resolve(token).await {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::debug!("{}", e);
                None
            }
        }
    }

    /// Derived title of the token's target.
    pub async fn display_title(&self, token: &str) -> Option<String> {
        self.resolve_reference(token)
            .await
            .map(|document| derive_title(&document))
    }

    /// Finish a deferred reference cell. Other cells pass through.
    pub async fn render(&self, cell: RenderedCell) -> RenderedCell {
        match cell {
            RenderedCell::Reference { id } => {
                match self.display_title(&tokens::encode_reference(&id)).await {
                    Some(text) if !text.is_empty() => RenderedCell::Text { text },
                    _ => RenderedCell::Empty,
                }
            }
            other => other,
        }
    }

    /// Forget every memoized lookup.
    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }
}
