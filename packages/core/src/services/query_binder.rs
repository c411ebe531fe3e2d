//! Query Binder
//!
//! Binds a filter expression to the store and exposes the latest result set.
//! `results()` is `None` until the first query resolves ("loading").
//!
//! Refetches are not deduplicated or cancelled. Each one takes a ticket from
//! a monotonic sequence and only lands if no newer ticket has landed before
//! it, so a slow, superseded query can never overwrite a newer result.

use crate::db::DocumentStore;
use crate::models::{Document, DocumentFilter};
use crate::services::error::{Result, TableError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct ResultSlot {
    /// Ticket of the result currently held (0 = none yet)
    ticket: u64,
    documents: Option<Arc<Vec<Document>>>,
}

/// Latest-result cache for one filter query
pub struct QueryBinder {
    store: Arc<dyn DocumentStore>,
    filter: DocumentFilter,
    next_ticket: AtomicU64,
    slot: RwLock<ResultSlot>,
}

impl QueryBinder {
    /// Create a binder. Nothing is queried until `refetch` runs.
    pub fn new(store: Arc<dyn DocumentStore>, filter: DocumentFilter) -> Self {
        Self {
            store,
            filter,
            next_ticket: AtomicU64::new(1),
            slot: RwLock::new(ResultSlot::default()),
        }
    }

    /// Create a binder and run its first query.
    pub async fn bind(store: Arc<dyn DocumentStore>, filter: DocumentFilter) -> Result<Self> {
        let binder = Self::new(store, filter);
        binder.refetch().await?;
        Ok(binder)
    }

    pub fn filter(&self) -> &DocumentFilter {
        &self.filter
    }

    /// Latest result set, `None` while the first query is in flight.
    pub async fn results(&self) -> Option<Arc<Vec<Document>>> {
        self.slot.read().await.documents.clone()
    }

    /// Issue the query and replace the result set when it resolves.
    ///
    /// Returns `true` if this resolution landed, `false` if a newer one had
    /// already landed and this result was discarded.
    pub async fn refetch(&self) -> Result<bool> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::AcqRel);
        tracing::debug!("Query {} issued: {}", ticket, self.filter);

        let documents = self
            .store
            .query(&self.filter)
            .await
            .map_err(TableError::ReadFailed)?;

        Ok(self.land(ticket, documents).await)
    }

    async fn land(&self, ticket: u64, documents: Vec<Document>) -> bool {
        let mut slot = self.slot.write().await;
        if ticket < slot.ticket {
            tracing::debug!(
                "Discarding stale query {} (holding {}) for {}",
                ticket,
                slot.ticket,
                self.filter
            );
            return false;
        }
        slot.ticket = ticket;
        slot.documents = Some(Arc::new(documents));
        true
    }

    /// Fire-and-forget refetch on the runtime.
    pub fn spawn_refetch(self: &Arc<Self>) -> JoinHandle<()> {
        let binder = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = binder.refetch().await {
                tracing::warn!("Background refetch of {} failed: {}", binder.filter, e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_results_none_until_first_resolution() {
        let store = Arc::new(MemoryStore::new());
        store.append_document("Book", "Dune\nis:: [[Book]]").await.unwrap();

        let binder = QueryBinder::new(store, DocumentFilter::tagged("is", "Book"));
        assert!(binder.results().await.is_none());

        assert!(binder.refetch().await.unwrap());
        assert_eq!(binder.results().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_refetch_picks_up_new_documents() {
        let store = Arc::new(MemoryStore::new());
        let binder = QueryBinder::bind(store.clone(), DocumentFilter::tagged("is", "Book"))
            .await
            .unwrap();
        assert!(binder.results().await.unwrap().is_empty());

        store.append_document("Book", "Dune\nis:: [[Book]]").await.unwrap();
        binder.refetch().await.unwrap();
        assert_eq!(binder.results().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_resolution_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        let binder = QueryBinder::new(store, DocumentFilter::tagged("is", "Book"));

        let old_ticket = binder.next_ticket.fetch_add(1, Ordering::AcqRel);
        let new_ticket = binder.next_ticket.fetch_add(1, Ordering::AcqRel);

        let newer = vec![Document::default(), Document::default()];
        assert!(binder.land(new_ticket, newer).await);
        assert!(!binder.land(old_ticket, vec![Document::default()]).await);
        assert_eq!(binder.results().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_spawn_refetch() {
        let store = Arc::new(MemoryStore::new());
        store.append_document("Book", "Dune\nis:: [[Book]]").await.unwrap();
        let binder = Arc::new(QueryBinder::new(store, DocumentFilter::tagged("is", "Book")));

        binder.spawn_refetch().await.unwrap();
        assert_eq!(binder.results().await.unwrap().len(), 1);
    }
}
