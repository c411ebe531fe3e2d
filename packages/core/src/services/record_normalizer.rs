//! Record Normalizer
//!
//! Maps query results to table rows. Documents missing content, identifier,
//! or page are structurally invalid for the table and are dropped without
//! surfacing an error.

use crate::models::{Document, RowRecord};
use crate::services::error::TableError;
use crate::utils::tokens;

/// Title precedence, first non-empty property wins.
const TITLE_PROPERTIES: &[&str] = &["label", "name", "title"];

/// Turns documents into rows
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Rows for every structurally valid document, in input order.
    pub fn normalize(&self, documents: &[Document]) -> Vec<RowRecord> {
        documents
            .iter()
            .filter_map(|doc| match self.normalize_one(doc) {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::debug!("Skipping document: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Row for a single document, or `MalformedDocument`.
    pub fn normalize_one(&self, document: &Document) -> Result<RowRecord, TableError> {
        check_structure(document)?;
        let page = document.page_name().unwrap_or_default().to_string();

        Ok(RowRecord {
            block_title: derive_title(document),
            page,
            content: document.content.clone(),
            properties: document.properties.clone(),
            block: document.clone(),
        })
    }
}

fn check_structure(document: &Document) -> Result<(), TableError> {
    let missing = if document.content.is_empty() {
        Some("content")
    } else if document.id.is_empty() {
        Some("identifier")
    } else if document.page.is_none() {
        Some("page")
    } else {
        None
    };

    match missing {
        Some(missing) => Err(TableError::MalformedDocument {
            id: document.id.clone(),
            missing,
        }),
        None => Ok(()),
    }
}

/// Display title of a document.
///
/// `label` > `name` > `title` > page name (pre-block only) > first content line.
pub fn derive_title(document: &Document) -> String {
    for property in TITLE_PROPERTIES {
        if let Some(title) = tokens::non_empty_text(document.property(property)) {
            return title;
        }
    }

    if document.pre_block {
        if let Some(page) = document.page_name() {
            return page.to_string();
        }
    }

    tokens::first_line(&document.content).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageRef;
    use serde_json::{json, Value};

    fn doc(content: &str, props: Value) -> Document {
        Document::new(content, props, Some(PageRef::new("page-1", "Reading List")))
    }

    #[test]
    fn test_title_precedence() {
        let all = doc(
            "First line",
            json!({"label": "L", "name": "N", "title": "T"}),
        );
        assert_eq!(derive_title(&all), "L");

        let name_title = doc("First line", json!({"name": "N", "title": "T"}));
        assert_eq!(derive_title(&name_title), "N");

        let title_only = doc("First line", json!({"title": "T"}));
        assert_eq!(derive_title(&title_only), "T");

        let empty_label = doc("First line", json!({"label": "", "title": "T"}));
        assert_eq!(derive_title(&empty_label), "T");
    }

    #[test]
    fn test_pre_block_uses_page_name_over_first_line() {
        let pre = doc("icon:: x", json!({"icon": "x"})).as_pre_block();
        assert_eq!(derive_title(&pre), "reading list");

        let ordinary = doc("Dune\nauthor:: Frank", json!({}));
        assert_eq!(derive_title(&ordinary), "Dune");
    }

    #[test]
    fn test_malformed_documents_are_excluded() {
        let valid = doc("Dune", json!({}));
        let no_content = doc("", json!({}));
        let mut no_id = doc("Dune", json!({}));
        no_id.id.clear();
        let mut no_page = doc("Dune", json!({}));
        no_page.page = None;

        let documents = vec![valid.clone(), no_content, no_id, no_page];
        let rows = RecordNormalizer::new().normalize(&documents);

        assert!(rows.len() <= documents.len());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].document_id(), valid.id);
    }

    #[test]
    fn test_malformed_reason_reported() {
        let mut no_page = doc("Dune", json!({}));
        no_page.page = None;
        match RecordNormalizer::new().normalize_one(&no_page) {
            Err(TableError::MalformedDocument { missing, .. }) => assert_eq!(missing, "page"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_row_flattens_properties() {
        let document = doc("Dune\nstatus:: Open", json!({"status": "Open", "pages": 412}));
        let row = RecordNormalizer::new().normalize_one(&document).unwrap();

        assert_eq!(row.block_title, "Dune");
        assert_eq!(row.page, "reading list");
        assert_eq!(row.get("status"), Some(json!("Open")));
        assert_eq!(row.get("pages"), Some(json!(412)));
        assert_eq!(row.block, document);
    }
}
