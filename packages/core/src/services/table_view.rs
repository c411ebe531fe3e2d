//! Table View
//!
//! Wires the binding pipeline together for one category and exposes what a
//! grid adapter consumes: rows, columns, the pinned staging row, and the
//! cell-commit and row-deletion actions.
//!
//! ```text
//! QueryBinder ─▶ RecordNormalizer ─▶ ColumnBuilder ◀─ SchemaResolver
//!                                         │
//!                                    grid adapter
//!                                         │
//!                  EditCoordinator ─▶ store ─▶ refresh
//! ```
//!
//! Rows and columns are rebuilt from scratch on every refresh.

use crate::config::BindingConfig;
use crate::db::DocumentStore;
use crate::models::{
    ColumnDescriptor, Document, DocumentFilter, FieldSchema, RenderedCell, RowRecord, RowTarget,
};
use crate::services::column_builder::ColumnBuilder;
use crate::services::edit_coordinator::{CommitOutcome, EditCoordinator};
use crate::services::editor_session::EditorSession;
use crate::services::error::{Result, TableError};
use crate::services::query_binder::QueryBinder;
use crate::services::record_normalizer::RecordNormalizer;
use crate::services::reference_resolver::ReferenceResolver;
use crate::services::schema_resolver::{SchemaResolver, SchemaWatch};
use serde_json::{Map, Value};
use std::sync::Arc;

/// One category presented as an editable table
pub struct TableView {
    category: String,
    binder: Arc<QueryBinder>,
    schema_resolver: SchemaResolver,
    normalizer: RecordNormalizer,
    column_builder: ColumnBuilder,
    references: ReferenceResolver,
    editor: EditCoordinator,
    schema: FieldSchema,
    rows: Vec<RowRecord>,
    columns: Vec<ColumnDescriptor>,
}

impl TableView {
    /// Bind a category and load its first rows and schema.
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        config: Arc<BindingConfig>,
        category: &str,
    ) -> Result<Self> {
        let filter = DocumentFilter::tagged(config.category_property.as_str(), category);
        tracing::info!("Opening table for '{}'", category);

        let mut view = Self {
            category: category.to_string(),
            binder: Arc::new(QueryBinder::new(Arc::clone(&store), filter)),
            schema_resolver: SchemaResolver::new(Arc::clone(&store), Arc::clone(&config)),
            normalizer: RecordNormalizer::new(),
            column_builder: ColumnBuilder::new(Arc::clone(&config)),
            references: ReferenceResolver::new(Arc::clone(&store)),
            editor: EditCoordinator::new(store, config, category),
            schema: FieldSchema::new(),
            rows: Vec::new(),
            columns: Vec::new(),
        };
        view.refresh().await?;
        Ok(view)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Re-run the query and schema lookup, then rebuild rows and columns.
    pub async fn refresh(&mut self) -> Result<()> {
        self.binder.refetch().await?;
        self.schema = self.schema_resolver.resolve_schema(&self.category).await;
        self.references.clear().await;
        self.rebuild().await;
        Ok(())
    }

    async fn rebuild(&mut self) {
        self.rows = match self.binder.results().await {
            Some(documents) => self.normalizer.normalize(&documents),
            None => Vec::new(),
        };
        self.columns = self.column_builder.build_columns(&self.rows, &self.schema);
    }

    /// Follow the configuration record; feed each yielded schema to
    /// `apply_schema`.
    pub async fn watch_schema(&self) -> Result<SchemaWatch> {
        self.schema_resolver.watch(&self.category).await
    }

    /// Swap in a new schema and rebuild the columns.
    pub fn apply_schema(&mut self, schema: FieldSchema) {
        self.schema = schema;
        self.columns = self.column_builder.build_columns(&self.rows, &self.schema);
    }

    /// True until the first query resolves.
    pub async fn is_loading(&self) -> bool {
        self.binder.results().await.is_none()
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, field: &str) -> Result<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .ok_or_else(|| TableError::ColumnNotFound {
                field: field.to_string(),
            })
    }

    pub fn row(&self, document_id: &str) -> Result<&RowRecord> {
        self.rows
            .iter()
            .find(|r| r.document_id() == document_id)
            .ok_or_else(|| TableError::row_not_found(document_id))
    }

    /// Row dataset for the grid.
    pub fn grid_rows(&self) -> Vec<Map<String, Value>> {
        self.rows.iter().map(RowRecord::to_grid_row).collect()
    }

    /// The pinned "create new" row.
    pub fn staging_row(&self) -> Map<String, Value> {
        self.editor.staging().to_grid_row()
    }

    pub fn edit_coordinator(&self) -> &EditCoordinator {
        &self.editor
    }

    /// Current value of a cell.
    pub fn cell_value(&self, target: &RowTarget, field: &str) -> Result<Option<Value>> {
        match target {
            RowTarget::Bound { document_id } => Ok(self.row(document_id)?.get(field)),
            RowTarget::Staging => Ok(self.editor.staging().get(field).cloned()),
        }
    }

    /// Open an editor on a cell, seeded with its current value.
    pub async fn open_editor(
        &mut self,
        target: RowTarget,
        field: &str,
    ) -> Result<Box<dyn EditorSession>> {
        let initial = self.cell_value(&target, field)?;
        let column = self.column(field)?.clone();
        self.editor
            .open_editor(&column, target, initial.as_ref())
            .await
    }

    /// Route a committed value to its row.
    ///
    /// The staging row accepts any field, including ones no column shows
    /// yet; bound rows only accept editable columns.
    pub async fn commit_cell(
        &mut self,
        target: &RowTarget,
        field: &str,
        value: Value,
    ) -> Result<CommitOutcome> {
        match target {
            RowTarget::Bound { document_id } => {
                if !self.column(field)?.is_editable(target) {
                    return Err(TableError::NotEditable {
                        field: field.to_string(),
                    });
                }
                let row = self
                    .rows
                    .iter_mut()
                    .find(|r| r.document_id() == document_id)
                    .ok_or_else(|| TableError::row_not_found(document_id.as_str()))?;
                Ok(self.editor.commit_bound(row, field, value).await)
            }
            RowTarget::Staging => Ok(self.editor.commit_staging(field, value)),
        }
    }

    /// Commit an editor session unless it asks to be discarded.
    ///
    /// Returns `None` when the session cancelled after editing.
    pub async fn commit_session(
        &mut self,
        session: Box<dyn EditorSession>,
    ) -> Result<Option<CommitOutcome>> {
        if session.cancel_after_edit() {
            tracing::debug!("Edit of '{}' discarded", session.field());
            self.editor.exit_edit();
            return Ok(None);
        }

        let target = session.target().clone();
        let field = session.field().to_string();
        let committed = match session.commit().await {
            Ok(value) => self.commit_cell(&target, &field, value).await,
            Err(e) => Err(e),
        };
        if committed.is_err() {
            self.editor.exit_edit();
        }
        committed.map(Some)
    }

    /// Promote the staging row into a new document, then refresh.
    pub async fn confirm_staging(&mut self) -> Result<Document> {
        let document = self.editor.promote().await?;
        self.refresh().await?;
        Ok(document)
    }

    /// Delete a row's document (or its whole page) and refresh either way.
    ///
    /// A failed deletion is reported ahead of a failed refresh.
    pub async fn delete_row(&mut self, document_id: &str) -> Result<()> {
        let document = self.row(document_id)?.block.clone();
        let deleted = self.editor.delete_row(&document).await;
        let refreshed = self.refresh().await;
        if let (Err(_), Err(e)) = (&deleted, &refreshed) {
            tracing::warn!("Refresh after failed delete of '{}': {}", document_id, e);
        }
        deleted.and(refreshed)
    }

    /// Display model of a cell, with references resolved to titles.
    pub async fn render_cell(&self, target: &RowTarget, field: &str) -> Result<RenderedCell> {
        let column = self.column(field)?;
        let value = self.cell_value(target, field)?;
        let cell = column.renderer.render(value.as_ref());
        Ok(self.references.render(cell).await)
    }

    /// Expanded detail of a row: its content, one paragraph per line.
    pub fn detail_paragraphs(&self, document_id: &str) -> Result<Vec<String>> {
        let row = self.row(document_id)?;
        Ok(row
            .content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use serde_json::json;

    async fn book_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .append_document("Book", "field.pages:: number\nfield.status:: select(Open;Closed)")
            .await
            .unwrap();
        store
            .append_document("Book", "Dune\nis:: [[Book]]\npages:: 412")
            .await
            .unwrap();
        store
    }

    async fn open(store: &Arc<MemoryStore>) -> TableView {
        TableView::open(store.clone(), Arc::new(BindingConfig::default()), "Book")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_builds_rows_and_columns() {
        let store = book_store().await;
        let view = open(&store).await;

        assert!(!view.is_loading().await);
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.rows()[0].block_title, "Dune");
        assert!(view.column("status").is_ok());
        assert_eq!(view.schema().len(), 2);
        assert!(view.staging_row().is_empty());
    }

    #[tokio::test]
    async fn test_commit_session_discards_invalid_input() {
        let store = book_store().await;
        let mut view = open(&store).await;
        let id = view.rows()[0].document_id().to_string();

        let mut session = view
            .open_editor(RowTarget::bound(id.as_str()), "pages")
            .await
            .unwrap();
        assert_eq!(session.input(), "412");
        session.set_input("many");

        assert_eq!(view.commit_session(session).await.unwrap(), None);
        assert!(view.edit_coordinator().editing().is_none());
        assert_eq!(
            store.get_property(&id, "pages").await.unwrap(),
            Some(json!("412"))
        );
    }

    #[tokio::test]
    async fn test_commit_session_error_exits_edit_mode() {
        let store = book_store().await;
        let mut view = open(&store).await;
        let id = view.rows()[0].document_id().to_string();

        let mut session = view
            .open_editor(RowTarget::bound(id.as_str()), "status")
            .await
            .unwrap();
        assert!(view.edit_coordinator().editing().is_some());

        // The column disappears before the commit lands.
        view.apply_schema(FieldSchema::new());
        session.set_input("Open");
        assert!(view.commit_session(session).await.is_err());
        assert!(view.edit_coordinator().editing().is_none());
    }

    #[tokio::test]
    async fn test_detail_paragraphs_split_lines() {
        let store = book_store().await;
        let view = open(&store).await;
        let id = view.rows()[0].document_id().to_string();

        assert_eq!(
            view.detail_paragraphs(&id).unwrap(),
            vec!["Dune", "is:: [[Book]]", "pages:: 412"]
        );
        assert!(matches!(
            view.detail_paragraphs("missing"),
            Err(TableError::RowNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_schema_rebuilds_columns() {
        let store = book_store().await;
        let mut view = open(&store).await;
        let mut watch = view.watch_schema().await.unwrap();

        let config_id = watch.document_id().to_string();
        store
            .upsert_property(&config_id, "field.rating", json!("select(1;2;3)"))
            .await
            .unwrap();

        let schema = watch.next().await.unwrap();
        view.apply_schema(schema);
        assert!(view.column("rating").is_ok());
    }
}
