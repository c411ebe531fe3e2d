//! Category discovery: every distinct tag carried in the category property.

use crate::config::BindingConfig;
use crate::db::DocumentStore;
use crate::models::DocumentFilter;
use crate::services::error::{Result, TableError};
use std::collections::HashSet;
use std::sync::Arc;

/// Known categories in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<String>,
}

impl CategoryCatalog {
    /// Query every categorized document and collect its tags.
    pub async fn discover(store: &Arc<dyn DocumentStore>, config: &BindingConfig) -> Result<Self> {
        let filter = DocumentFilter::HasProperty {
            name: config.category_property.clone(),
        };
        let documents = store.query(&filter).await.map_err(TableError::ReadFailed)?;

        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for tag in documents
            .iter()
            .flat_map(|doc| doc.category_tags(&config.category_property))
        {
            if seen.insert(tag.to_lowercase()) {
                categories.push(tag);
            }
        }

        tracing::debug!("Discovered {} categories", categories.len());
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The category a table opens on when none is chosen.
    pub fn default_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}
