//! Column Builder
//!
//! Columns are a pure function of (rows, schema): the union of every key seen
//! on a row with every declared field, one descriptor per key. Nothing is
//! carried over between builds.

use crate::config::BindingConfig;
use crate::models::{
    ColumnBehavior, ColumnDescriptor, FieldSchema, FieldType, PinSide, RowRecord,
    BLOCK_FIELD, BLOCK_TITLE_FIELD,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Derives column descriptors from rows and a field schema
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    config: Arc<BindingConfig>,
}

impl ColumnBuilder {
    pub fn new(config: Arc<BindingConfig>) -> Self {
        Self { config }
    }

    /// Build the column set.
    ///
    /// Order: the title column, then keys in first-seen row order, then
    /// declared fields that no row carries yet.
    pub fn build_columns(&self, rows: &[RowRecord], schema: &FieldSchema) -> Vec<ColumnDescriptor> {
        let fields = collect_fields(rows, schema);
        tracing::debug!(
            "Building {} columns from {} rows and {} declarations",
            fields.len(),
            rows.len(),
            schema.len()
        );

        fields
            .iter()
            .map(|field| self.build_column(field, schema))
            .collect()
    }

    /// Descriptor for a single field.
    pub fn build_column(&self, field: &str, schema: &FieldSchema) -> ColumnDescriptor {
        let behavior = if field == BLOCK_TITLE_FIELD {
            ColumnBehavior::Title
        } else {
            let field_type = schema
                .get(field)
                .map(|decl| decl.field_type())
                .unwrap_or(FieldType::Default);
            ColumnBehavior::Typed { field_type }
        };

        let mut column = ColumnDescriptor::new(field, behavior);
        column.hidden = self.config.is_hidden(field);
        column.read_only_when_bound = self.config.is_read_only(field);

        if field == BLOCK_TITLE_FIELD {
            column.header_name = self.config.title_header.clone();
            column.pinned = Some(PinSide::Left);
            column.width = Some(self.config.title_width);
        }

        column
    }
}

fn collect_fields(rows: &[RowRecord], schema: &FieldSchema) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();
    let mut push = |field: &str| {
        if field != BLOCK_FIELD && seen.insert(field.to_string()) {
            fields.push(field.to_string());
        }
    };

    push(BLOCK_TITLE_FIELD);
    for row in rows {
        for key in row.keys() {
            push(&key);
        }
    }
    for field in schema.keys() {
        push(field);
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CellEditor, CellRenderer, Document, FieldTypeDeclaration, PageRef, RowTarget,
    };
    use crate::services::RecordNormalizer;
    use serde_json::{json, Value};

    fn builder() -> ColumnBuilder {
        ColumnBuilder::new(Arc::new(BindingConfig::default()))
    }

    fn rows(props: &[Value]) -> Vec<RowRecord> {
        let documents: Vec<Document> = props
            .iter()
            .map(|p| Document::new("Entry", p.clone(), Some(PageRef::new("p", "Book"))))
            .collect();
        RecordNormalizer::new().normalize(&documents)
    }

    fn column<'a>(columns: &'a [ColumnDescriptor], field: &str) -> &'a ColumnDescriptor {
        columns
            .iter()
            .find(|c| c.field == field)
            .unwrap_or_else(|| panic!("no column {}", field))
    }

    #[test]
    fn test_structural_fields_hidden() {
        let rows = rows(&[json!({
            "is": "Book",
            "title": "T",
            "content": "c",
            "page": "p",
            "name": "N",
            "custom1": "x"
        })]);
        let columns = builder().build_columns(&rows, &FieldSchema::new());

        for hidden in ["is", "title", "content", "page", "name"] {
            assert!(column(&columns, hidden).hidden, "{} should be hidden", hidden);
        }
        assert!(!column(&columns, "custom1").hidden);
        assert!(!column(&columns, "blockTitle").hidden);
        assert!(columns.iter().all(|c| c.field != "block"));
    }

    #[test]
    fn test_declared_field_without_rows_still_appears() {
        let mut schema = FieldSchema::new();
        schema.insert("rating".into(), FieldTypeDeclaration::parse("number"));

        let columns = builder().build_columns(&[], &schema);
        let fields: Vec<&str> = columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["blockTitle", "rating"]);
        assert_eq!(column(&columns, "rating").renderer, CellRenderer::Numeric);
    }

    #[test]
    fn test_title_column_is_pinned_and_read_only_when_bound() {
        let columns = builder().build_columns(&rows(&[json!({"status": "Open"})]), &FieldSchema::new());
        let title = &columns[0];

        assert_eq!(title.field, "blockTitle");
        assert_eq!(title.header_name, "Block");
        assert_eq!(title.pinned, Some(PinSide::Left));
        assert_eq!(title.width, Some(300));
        assert!(!title.is_editable(&RowTarget::bound("doc-1")));
        assert!(title.is_editable(&RowTarget::Staging));

        let status = column(&columns, "status");
        assert!(status.is_editable(&RowTarget::bound("doc-1")));
        assert_eq!(status.editor, CellEditor::InlineText);
    }

    #[test]
    fn test_declared_kind_selects_behavior() {
        let mut schema = FieldSchema::new();
        schema.insert("author".into(), FieldTypeDeclaration::parse("reference(Person)"));
        schema.insert("status".into(), FieldTypeDeclaration::parse("select(Open;Closed)"));

        let columns = builder().build_columns(
            &rows(&[json!({"author": "((uuid-1))", "status": "Open", "notes": "n"})]),
            &schema,
        );

        assert_eq!(
            column(&columns, "author").editor,
            CellEditor::ReferenceChoice {
                target_category: Some("Person".into())
            }
        );
        assert_eq!(column(&columns, "status").renderer, CellRenderer::Pill);
        assert_eq!(
            column(&columns, "notes").behavior,
            ColumnBehavior::Typed {
                field_type: FieldType::Default
            }
        );
    }

    #[test]
    fn test_union_is_deduplicated_in_first_seen_order() {
        let columns = builder().build_columns(
            &rows(&[json!({"b": 1, "a": 2}), json!({"a": 3, "c": 4})]),
            &FieldSchema::new(),
        );
        let visible: Vec<&str> = columns
            .iter()
            .filter(|c| !c.hidden)
            .map(|c| c.field.as_str())
            .collect();

        assert_eq!(visible.len(), 4);
        assert_eq!(visible[0], "blockTitle");
        assert!(visible.contains(&"a") && visible.contains(&"b") && visible.contains(&"c"));
    }
}
