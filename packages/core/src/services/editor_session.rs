//! Editor Sessions
//!
//! One session is constructed per cell edit and dropped when the editor
//! closes. The grid drives it through a fixed lifecycle:
//!
//! 1. `cancel_before_start()`: `true` means the editor should not open
//! 2. `set_input(..)` as the user types or picks
//! 3. `cancel_after_edit()`: `true` means the edit is discarded
//! 4. `commit()`: the value to hand to the edit coordinator
//!
//! Values are encoded here: dates become `[[yyyy-mm-dd]]`, references
//! `((identifier))`, numbers JSON integers.

use crate::db::DocumentStore;
use crate::models::{Document, RowTarget, ID_PROPERTY};
use crate::services::error::{Result, TableError};
use crate::services::record_normalizer::derive_title;
use crate::utils::tokens;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Stored date format (the part inside `[[...]]`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One entry of a choice-list editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorOption {
    /// What `set_input` expects
    pub value: String,
    /// What the user sees
    pub label: String,
}

impl EditorOption {
    fn plain(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

/// Lifecycle of a single cell edit
#[async_trait]
pub trait EditorSession: Send {
    /// Field being edited
    fn field(&self) -> &str;

    /// Row being edited
    fn target(&self) -> &RowTarget;

    /// Current editor input
    fn input(&self) -> &str;

    /// Replace the editor input
    fn set_input(&mut self, input: &str);

    /// Choices offered by list editors; empty for free-form editors
    fn options(&self) -> &[EditorOption] {
        &[]
    }

    /// Whether the editor should refuse to open
    fn cancel_before_start(&self) -> bool {
        false
    }

    /// Whether the current input should be discarded instead of committed
    fn cancel_after_edit(&self) -> bool {
        false
    }

    /// Finish the edit and produce the value to store
    async fn commit(self: Box<Self>) -> Result<Value>;
}

/// Inline or multi-line free text
pub struct TextSession {
    field: String,
    target: RowTarget,
    input: String,
    multiline: bool,
}

impl TextSession {
    pub fn new(field: &str, target: RowTarget, initial: Option<&Value>, multiline: bool) -> Self {
        Self {
            field: field.to_string(),
            target,
            input: initial.map(tokens::format_property_value).unwrap_or_default(),
            multiline,
        }
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }
}

#[async_trait]
impl EditorSession for TextSession {
    fn field(&self) -> &str {
        &self.field
    }

    fn target(&self) -> &RowTarget {
        &self.target
    }

    fn input(&self) -> &str {
        &self.input
    }

    fn set_input(&mut self, input: &str) {
        self.input = if self.multiline {
            input.to_string()
        } else {
            input.replace(['\r', '\n'], " ")
        };
    }

    async fn commit(self: Box<Self>) -> Result<Value> {
        Ok(Value::String(self.input))
    }
}

/// Fixed choice list (select columns)
pub struct ChoiceSession {
    field: String,
    target: RowTarget,
    input: String,
    options: Vec<EditorOption>,
}

impl ChoiceSession {
    pub fn new(field: &str, target: RowTarget, initial: Option<&Value>, options: &[String]) -> Self {
        Self {
            field: field.to_string(),
            target,
            input: initial.map(tokens::format_property_value).unwrap_or_default(),
            options: options.iter().map(|o| EditorOption::plain(o)).collect(),
        }
    }

    fn is_valid(&self) -> bool {
        self.input.is_empty() || self.options.iter().any(|o| o.value == self.input)
    }
}

#[async_trait]
impl EditorSession for ChoiceSession {
    fn field(&self) -> &str {
        &self.field
    }

    fn target(&self) -> &RowTarget {
        &self.target
    }

    fn input(&self) -> &str {
        &self.input
    }

    fn set_input(&mut self, input: &str) {
        self.input = input.trim().to_string();
    }

    fn options(&self) -> &[EditorOption] {
        &self.options
    }

    fn cancel_before_start(&self) -> bool {
        self.options.is_empty()
    }

    fn cancel_after_edit(&self) -> bool {
        !self.is_valid()
    }

    async fn commit(self: Box<Self>) -> Result<Value> {
        if !self.is_valid() {
            return Err(TableError::invalid_input(
                &self.field,
                format!("'{}' is not one of the declared options", self.input),
            ));
        }
        Ok(Value::String(self.input))
    }
}

/// Integer input
pub struct NumberSession {
    field: String,
    target: RowTarget,
    input: String,
}

impl NumberSession {
    pub fn new(field: &str, target: RowTarget, initial: Option<&Value>) -> Self {
        Self {
            field: field.to_string(),
            target,
            input: initial.map(tokens::format_property_value).unwrap_or_default(),
        }
    }

    fn parsed(&self) -> Option<i64> {
        self.input.trim().parse().ok()
    }
}

#[async_trait]
impl EditorSession for NumberSession {
    fn field(&self) -> &str {
        &self.field
    }

    fn target(&self) -> &RowTarget {
        &self.target
    }

    fn input(&self) -> &str {
        &self.input
    }

    fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
    }

    fn cancel_after_edit(&self) -> bool {
        self.parsed().is_none()
    }

    async fn commit(self: Box<Self>) -> Result<Value> {
        match self.parsed() {
            Some(n) => Ok(Value::from(n)),
            None => Err(TableError::invalid_input(
                &self.field,
                format!("'{}' is not an integer", self.input),
            )),
        }
    }
}

/// Date picker; stores `[[yyyy-mm-dd]]`
pub struct DateSession {
    field: String,
    target: RowTarget,
    input: String,
}

impl DateSession {
    /// The picker shows the bare date, so a stored `[[...]]` is unwrapped.
    pub fn new(field: &str, target: RowTarget, initial: Option<&Value>) -> Self {
        let raw = initial.map(tokens::format_property_value).unwrap_or_default();
        let input = tokens::parse_page_link(&raw).unwrap_or(raw);
        Self {
            field: field.to_string(),
            target,
            input,
        }
    }

    fn parsed(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.input.trim(), DATE_FORMAT).ok()
    }
}

#[async_trait]
impl EditorSession for DateSession {
    fn field(&self) -> &str {
        &self.field
    }

    fn target(&self) -> &RowTarget {
        &self.target
    }

    fn input(&self) -> &str {
        &self.input
    }

    fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
    }

    fn cancel_after_edit(&self) -> bool {
        self.parsed().is_none()
    }

    async fn commit(self: Box<Self>) -> Result<Value> {
        let date = self.parsed().ok_or_else(|| {
            TableError::invalid_input(
                &self.field,
                format!("'{}' is not a yyyy-mm-dd date", self.input),
            )
        })?;
        let formatted = date.format(DATE_FORMAT).to_string();
        Ok(Value::String(tokens::encode_page_link(&formatted)))
    }
}

/// Choice list over every document of the target category
pub struct ReferenceSession {
    field: String,
    target: RowTarget,
    input: String,
    options: Vec<EditorOption>,
    store: Arc<dyn DocumentStore>,
}

impl ReferenceSession {
    /// `candidates` are the documents tagged with the declared target category.
    pub fn new(
        field: &str,
        target: RowTarget,
        initial: Option<&Value>,
        candidates: &[Document],
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let input = initial
            .map(tokens::format_property_value)
            .and_then(|raw| tokens::parse_reference(&raw))
            .unwrap_or_default();
        let options = candidates
            .iter()
            .filter(|doc| !doc.id.is_empty())
            .map(|doc| EditorOption {
                value: doc.id.clone(),
                label: derive_title(doc),
            })
            .collect();

        Self {
            field: field.to_string(),
            target,
            input,
            options,
            store,
        }
    }

    fn selected(&self) -> Option<&EditorOption> {
        self.options.iter().find(|o| o.value == self.input)
    }

    /// Give the target an explicit `id` property so the token stays
    /// dereferenceable. Store failures are logged; the token is still
    /// returned to the caller.
    async fn ensure_self_id(&self, id: &str) {
        let current = match self.store.get_property(id, ID_PROPERTY).await {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!("{}", TableError::ReadFailed(e));
                return;
            }
        };

        if current.as_ref().and_then(Value::as_str) == Some(id) {
            return;
        }

        if let Err(e) = self
            .store
            .upsert_property(id, ID_PROPERTY, Value::String(id.to_string()))
            .await
        {
            tracing::warn!("{}", TableError::write_failed("ensure_self_id", e));
        }
    }
}

#[async_trait]
impl EditorSession for ReferenceSession {
    fn field(&self) -> &str {
        &self.field
    }

    fn target(&self) -> &RowTarget {
        &self.target
    }

    fn input(&self) -> &str {
        &self.input
    }

    /// Accepts the target identifier or a full `((identifier))` token.
    fn set_input(&mut self, input: &str) {
        self.input = tokens::parse_reference(input).unwrap_or_else(|| input.trim().to_string());
    }

    fn options(&self) -> &[EditorOption] {
        &self.options
    }

    fn cancel_before_start(&self) -> bool {
        self.options.is_empty()
    }

    fn cancel_after_edit(&self) -> bool {
        self.selected().is_none()
    }

    async fn commit(self: Box<Self>) -> Result<Value> {
        if self.selected().is_none() {
            return Err(TableError::invalid_input(
                &self.field,
                format!("'{}' is not a document of the target category", self.input),
            ));
        }
        self.ensure_self_id(&self.input).await;
        Ok(Value::String(tokens::encode_reference(&self.input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::DocumentFilter;
    use serde_json::json;

    #[tokio::test]
    async fn test_date_wraps_and_unwraps() {
        let mut session = Box::new(DateSession::new(
            "due",
            RowTarget::Staging,
            Some(&json!("[[2024-04-30]]")),
        ));
        assert_eq!(session.input(), "2024-04-30");

        session.set_input("2024-05-01");
        assert!(!session.cancel_after_edit());
        assert_eq!(session.commit().await.unwrap(), json!("[[2024-05-01]]"));
    }

    #[tokio::test]
    async fn test_invalid_date_cancels() {
        let mut session = Box::new(DateSession::new("due", RowTarget::Staging, None));
        session.set_input("May 1st");
        assert!(session.cancel_after_edit());
        assert!(matches!(
            session.commit().await,
            Err(TableError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_number_parses_integers_only() {
        let mut session = Box::new(NumberSession::new("pages", RowTarget::bound("d"), None));
        session.set_input("12.5");
        assert!(session.cancel_after_edit());

        session.set_input(" 412 ");
        assert!(!session.cancel_after_edit());
        assert_eq!(session.commit().await.unwrap(), json!(412));
    }

    #[tokio::test]
    async fn test_choice_restricted_to_options() {
        let options = vec!["Open".to_string(), "Closed".to_string()];
        let mut session = Box::new(ChoiceSession::new(
            "status",
            RowTarget::bound("d"),
            Some(&json!("Open")),
            &options,
        ));
        assert!(!session.cancel_before_start());
        assert_eq!(session.options().len(), 2);

        session.set_input("Blocked");
        assert!(session.cancel_after_edit());

        session.set_input("Closed");
        assert_eq!(session.commit().await.unwrap(), json!("Closed"));

        let empty = ChoiceSession::new("status", RowTarget::Staging, None, &[]);
        assert!(empty.cancel_before_start());
    }

    #[tokio::test]
    async fn test_single_line_text_strips_breaks() {
        let mut inline = Box::new(TextSession::new("notes", RowTarget::Staging, None, false));
        inline.set_input("a\nb");
        assert_eq!(inline.commit().await.unwrap(), json!("a b"));

        let mut multi = Box::new(TextSession::new("notes", RowTarget::Staging, None, true));
        multi.set_input("a\nb");
        assert!(multi.is_multiline());
        assert_eq!(multi.commit().await.unwrap(), json!("a\nb"));
    }

    #[tokio::test]
    async fn test_reference_commit_writes_token_and_self_id() {
        let store = Arc::new(MemoryStore::new());
        let person = store
            .append_document("Person", "Frank Herbert\nis:: [[Person]]")
            .await
            .unwrap();
        let candidates = store
            .query(&DocumentFilter::tagged("is", "Person"))
            .await
            .unwrap();

        let mut session = Box::new(ReferenceSession::new(
            "author",
            RowTarget::Staging,
            None,
            &candidates,
            store.clone(),
        ));
        assert_eq!(session.options()[0].label, "Frank Herbert");

        session.set_input(&person.id);
        let value = session.commit().await.unwrap();
        assert_eq!(value, json!(format!("(({}))", person.id)));

        let id = store.get_property(&person.id, "id").await.unwrap();
        assert_eq!(id, Some(json!(person.id)));
    }

    #[tokio::test]
    async fn test_reference_commit_survives_failed_self_id_write() {
        let store = Arc::new(MemoryStore::new());
        let person = store
            .append_document("Person", "Frank Herbert\nis:: [[Person]]")
            .await
            .unwrap();
        let candidates = store
            .query(&DocumentFilter::tagged("is", "Person"))
            .await
            .unwrap();

        let mut session = Box::new(ReferenceSession::new(
            "author",
            RowTarget::Staging,
            None,
            &candidates,
            store.clone(),
        ));
        session.set_input(&person.id);

        store.set_fail_writes(true);
        let value = session.commit().await.unwrap();
        assert_eq!(value, json!(format!("(({}))", person.id)));
        assert_eq!(store.get_property(&person.id, "id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reference_rejects_unknown_target() {
        let store = Arc::new(MemoryStore::new());
        let mut session = Box::new(ReferenceSession::new(
            "author",
            RowTarget::Staging,
            Some(&json!("((gone))")),
            &[],
            store,
        ));
        assert_eq!(session.input(), "gone");
        assert!(session.cancel_before_start());

        session.set_input("((other))");
        assert!(session.cancel_after_edit());
        assert!(session.commit().await.is_err());
    }
}
