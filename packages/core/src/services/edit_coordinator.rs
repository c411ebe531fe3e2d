//! Edit Coordinator
//!
//! Routes committed cell values to their destination. Each row is in one of
//! two states:
//!
//! - **Bound**: backed by a document; commits upsert a property on it
//! - **Staging**: the pinned "create new" row; commits accumulate in the
//!   `StagingRecord` until `promote` appends a new document
//!
//! Store failures never roll back local state. A failed bound write keeps
//! the optimistic cell value; a failed promotion keeps the staged values so
//! the user can retry.

use crate::config::BindingConfig;
use crate::db::DocumentStore;
use crate::models::{
    CellEditor, ColumnDescriptor, Document, DocumentFilter, RowRecord, RowTarget, StagingRecord,
    BLOCK_FIELD, BLOCK_TITLE_FIELD, CONTENT_FIELD, PAGE_FIELD,
};
use crate::services::editor_session::{
    ChoiceSession, DateSession, EditorSession, NumberSession, ReferenceSession, TextSession,
};
use crate::services::error::{Result, TableError};
use crate::utils::tokens;
use serde_json::Value;
use std::sync::Arc;

/// Result of routing one cell commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Written to the store
    Persisted,
    /// Held in the staging record
    Staged,
    /// The store rejected the write; the optimistic value stays
    Failed,
}

/// The cell currently being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEdit {
    pub target: RowTarget,
    pub field: String,
}

/// Owns the staging record and the edit-mode state of one table
pub struct EditCoordinator {
    store: Arc<dyn DocumentStore>,
    config: Arc<BindingConfig>,
    category: String,
    staging: StagingRecord,
    editing: Option<ActiveEdit>,
}

impl EditCoordinator {
    pub fn new(store: Arc<dyn DocumentStore>, config: Arc<BindingConfig>, category: &str) -> Self {
        Self {
            store,
            config,
            category: category.to_string(),
            staging: StagingRecord::new(),
            editing: None,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn staging(&self) -> &StagingRecord {
        &self.staging
    }

    pub fn editing(&self) -> Option<&ActiveEdit> {
        self.editing.as_ref()
    }

    pub fn exit_edit(&mut self) {
        self.editing = None;
    }

    /// Start editing a cell.
    ///
    /// The session type follows the column's editor behavior. Reference
    /// editors query the target category for their choices up front.
    pub async fn open_editor(
        &mut self,
        column: &ColumnDescriptor,
        target: RowTarget,
        initial: Option<&Value>,
    ) -> Result<Box<dyn EditorSession>> {
        if !column.is_editable(&target) {
            return Err(TableError::NotEditable {
                field: column.field.clone(),
            });
        }

        let field = column.field.as_str();
        let session: Box<dyn EditorSession> = match &column.editor {
            CellEditor::InlineText => {
                Box::new(TextSession::new(field, target.clone(), initial, false))
            }
            CellEditor::MultilineText => {
                Box::new(TextSession::new(field, target.clone(), initial, true))
            }
            CellEditor::Choice { options } => {
                Box::new(ChoiceSession::new(field, target.clone(), initial, options))
            }
            CellEditor::NumericInput => Box::new(NumberSession::new(field, target.clone(), initial)),
            CellEditor::DatePicker => Box::new(DateSession::new(field, target.clone(), initial)),
            CellEditor::ReferenceChoice { target_category } => {
                let candidates = match target_category {
                    Some(category) => self
                        .store
                        .query(&DocumentFilter::tagged(
                            self.config.category_property.as_str(),
                            category.as_str(),
                        ))
                        .await
                        .map_err(TableError::ReadFailed)?,
                    None => {
                        tracing::warn!("Reference column '{}' declares no target category", field);
                        Vec::new()
                    }
                };
                Box::new(ReferenceSession::new(
                    field,
                    target.clone(),
                    initial,
                    &candidates,
                    Arc::clone(&self.store),
                ))
            }
        };

        self.editing = Some(ActiveEdit {
            target,
            field: field.to_string(),
        });
        Ok(session)
    }

    /// Commit on a bound row: write through, update the row optimistically.
    pub async fn commit_bound(&mut self, row: &mut RowRecord, field: &str, value: Value) -> CommitOutcome {
        let document_id = row.document_id().to_string();
        let result = self
            .store
            .upsert_property(&document_id, field, value.clone())
            .await;

        row.set(field, value);
        self.exit_edit();

        match result {
            Ok(()) => {
                tracing::debug!("Updated {}.{}", document_id, field);
                CommitOutcome::Persisted
            }
            Err(e) => {
                let err = TableError::write_failed("commit_bound", e);
                tracing::warn!("Keeping optimistic value for {}.{}: {}", document_id, field, err);
                CommitOutcome::Failed
            }
        }
    }

    /// Commit on the staging row: accumulate, never touch the store.
    pub fn commit_staging(&mut self, field: &str, value: Value) -> CommitOutcome {
        self.staging.set(field, value);
        CommitOutcome::Staged
    }

    /// Content of the document the staging record would become.
    ///
    /// The title line comes first, then the category membership line, then
    /// one line per other staged field in the order staged. Fields staged
    /// with an empty value are left out, as is a staged category property
    /// (membership is always the second line).
    pub fn synthesize_content(&self) -> Result<String> {
        let title = tokens::non_empty_text(self.staging.get(BLOCK_TITLE_FIELD))
            .ok_or(TableError::EmptyStagingTitle)?;

        let mut lines = vec![
            title,
            tokens::category_line(&self.config.category_property, &self.category),
        ];

        for (field, value) in self.staging.iter() {
            if self.is_synthesized_field(field) {
                continue;
            }
            let text = tokens::format_property_value(value);
            if text.is_empty() {
                continue;
            }
            lines.push(tokens::property_line(field, &text));
        }

        Ok(lines.join("\n"))
    }

    fn is_synthesized_field(&self, field: &str) -> bool {
        field == BLOCK_TITLE_FIELD
            || field == BLOCK_FIELD
            || field == PAGE_FIELD
            || field == CONTENT_FIELD
            || field == self.config.category_property
    }

    /// Append the staged record as a new document on the category page.
    ///
    /// On success the staging record is cleared and edit mode exits. On
    /// failure nothing is cleared.
    pub async fn promote(&mut self) -> Result<Document> {
        let content = self.synthesize_content()?;

        match self.store.append_document(&self.category, &content).await {
            Ok(document) => {
                tracing::info!(
                    "Promoted staging row to {} on '{}'",
                    document.id,
                    self.category
                );
                self.staging.clear();
                self.exit_edit();
                Ok(document)
            }
            Err(e) => {
                let err = TableError::write_failed("promote", e);
                tracing::warn!("Staging row kept for retry: {}", err);
                Err(err)
            }
        }
    }

    /// Remove a row's document. A page's leading block takes the whole
    /// page with it.
    pub async fn delete_row(&self, document: &Document) -> Result<()> {
        let result = match (document.pre_block, document.page_name()) {
            (true, Some(page)) => {
                tracing::info!("Removing page '{}' with its leading block", page);
                self.store.remove_page(page).await
            }
            _ => self.store.remove_document(&document.id).await,
        };

        result.map_err(|e| {
            let err = TableError::write_failed("delete_row", e);
            tracing::warn!("{}", err);
            err
        })
    }
}
