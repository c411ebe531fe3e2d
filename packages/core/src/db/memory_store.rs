//! In-Memory Document Store
//!
//! `MemoryStore` implements `DocumentStore` over plain maps. It mirrors the
//! host store's observable behavior closely enough for the binding engine:
//!
//! - pages are looked up case-insensitively and created on first append
//! - appended content has its `key:: value` lines parsed into properties
//! - the first block of a page made only of property lines is its pre-block
//! - property upserts rewrite the matching content line
//!
//! Writes can be switched to fail, which is how tests exercise the
//! `WriteFailed` paths.

use crate::db::{DocumentEvent, DocumentStore, StoreError};
use crate::models::{Document, DocumentFilter, PageRef};
use crate::utils::tokens;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Broadcast capacity; lagging subscribers skip older events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
struct PageEntry {
    page: PageRef,
    /// Document ids in page order
    blocks: Vec<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<String, Document>,
    /// Pages in creation order
    pages: Vec<PageEntry>,
}

impl MemoryState {
    fn page_index(&self, name: &str) -> Option<usize> {
        let key = name.to_lowercase();
        self.pages.iter().position(|p| p.page.name == key)
    }

    fn ensure_page(&mut self, name: &str) -> usize {
        if let Some(idx) = self.page_index(name) {
            return idx;
        }
        self.pages.push(PageEntry {
            page: PageRef::new(Uuid::new_v4().to_string(), name),
            blocks: Vec::new(),
        });
        self.pages.len() - 1
    }

    fn ordered_documents(&self) -> impl Iterator<Item = &Document> {
        self.pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .filter_map(|id| self.documents.get(id))
    }
}

/// Document store held entirely in memory
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    events: broadcast::Sender<DocumentEvent>,
    fail_writes: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(MemoryState::default()),
            events,
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent mutation fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.state.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_writable(&self, operation: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(StoreError::write_rejected(operation.to_string()).into());
        }
        Ok(())
    }

    fn emit(&self, event: DocumentEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        Ok(state
            .ordered_documents()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.state.read().await.documents.get(id).cloned())
    }

    async fn get_property(&self, id: &str, name: &str) -> Result<Option<Value>> {
        let state = self.state.read().await;
        Ok(state
            .documents
            .get(id)
            .and_then(|doc| doc.properties.get(name).cloned()))
    }

    async fn get_all_properties(&self, id: &str) -> Result<Map<String, Value>> {
        let state = self.state.read().await;
        state
            .documents
            .get(id)
            .map(|doc| doc.properties.clone())
            .ok_or_else(|| StoreError::document_not_found(id).into())
    }

    async fn get_page_documents(&self, page_name: &str) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        let Some(idx) = state.page_index(page_name) else {
            return Ok(Vec::new());
        };
        Ok(state.pages[idx]
            .blocks
            .iter()
            .filter_map(|id| state.documents.get(id).cloned())
            .collect())
    }

    async fn upsert_property(&self, id: &str, name: &str, value: Value) -> Result<()> {
        self.check_writable("upsert_property")?;
        let properties = {
            let mut state = self.state.write().await;
            let doc = state
                .documents
                .get_mut(id)
                .ok_or_else(|| StoreError::document_not_found(id))?;
            doc.content = tokens::upsert_property_line(&doc.content, name, &value);
            doc.properties.insert(name.to_string(), value);
            doc.properties.clone()
        };

        self.emit(DocumentEvent::PropertyChanged {
            document_id: id.to_string(),
            properties,
        });
        Ok(())
    }

    async fn append_document(&self, page_name: &str, content: &str) -> Result<Document> {
        self.check_writable("append_document")?;
        let document = {
            let mut state = self.state.write().await;
            let idx = state.ensure_page(page_name);
            let entry = &mut state.pages[idx];

            let mut document = Document::new(
                content,
                Value::Object(tokens::extract_properties(content)),
                Some(entry.page.clone()),
            );
            document.left_id = Some(
                entry
                    .blocks
                    .last()
                    .cloned()
                    .unwrap_or_else(|| entry.page.id.clone()),
            );
            document.pre_block = entry.blocks.is_empty() && tokens::is_properties_only(content);
            entry.blocks.push(document.id.clone());

            state
                .documents
                .insert(document.id.clone(), document.clone());
            document
        };

        tracing::debug!("Appended document {} to page '{}'", document.id, page_name);
        self.emit(DocumentEvent::DocumentAppended {
            document_id: document.id.clone(),
            page_name: page_name.to_string(),
        });
        Ok(document)
    }

    async fn remove_document(&self, id: &str) -> Result<()> {
        self.check_writable("remove_document")?;
        {
            let mut state = self.state.write().await;
            let removed = state
                .documents
                .remove(id)
                .ok_or_else(|| StoreError::document_not_found(id))?;

            // Re-link the next sibling to the removed block's left neighbor
            let mut next_id = None;
            for entry in state.pages.iter_mut() {
                if let Some(pos) = entry.blocks.iter().position(|b| b == id) {
                    entry.blocks.remove(pos);
                    next_id = entry.blocks.get(pos).cloned();
                    break;
                }
            }
            if let Some(next) = next_id.and_then(|n| state.documents.get_mut(&n)) {
                next.left_id = removed.left_id;
            }
        }

        self.emit(DocumentEvent::DocumentRemoved {
            document_id: id.to_string(),
        });
        Ok(())
    }

    async fn remove_page(&self, page_name: &str) -> Result<()> {
        self.check_writable("remove_page")?;
        {
            let mut state = self.state.write().await;
            let idx = state
                .page_index(page_name)
                .ok_or_else(|| StoreError::page_not_found(page_name))?;
            let entry = state.pages.remove(idx);
            for id in entry.blocks {
                state.documents.remove(&id);
            }
        }

        self.emit(DocumentEvent::PageRemoved {
            page_name: page_name.to_lowercase(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
        self.events.subscribe()
    }
}
