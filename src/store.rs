//! In-memory registry of live document indices.
//!
//! The store owns every [`DocumentIndex`] and maps opaque document ids to
//! them. State lives only in process memory; a restart forgets every
//! document, and callers are expected to re-ingest.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::DocumentId;
use crate::error::{DocIntelError, Result};
use crate::index::DocumentIndex;

/// Concurrent registry mapping document ids to their indices.
///
/// Indices are held behind [`Arc`] so lookups hand out a cheap clone and
/// no lock is held while a caller queries the index. Ids are UUID v4,
/// minted at registration; callers never pick their own.
///
/// An unbounded store ([`DocumentStore::new`]) keeps every document until
/// it is removed or the process exits. A bounded store
/// ([`DocumentStore::with_capacity`]) evicts the oldest registration once
/// the bound is reached.
#[derive(Debug, Default)]
pub struct DocumentStore {
    inner: RwLock<StoreInner>,
    capacity: Option<usize>,
}

#[derive(Debug, Default)]
struct StoreInner {
    documents: HashMap<DocumentId, Arc<DocumentIndex>>,
    // Live ids in registration order, used for first-in-first-out eviction.
    registration_order: VecDeque<DocumentId>,
}

impl DocumentStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that holds at most `capacity` documents, evicting
    /// the oldest registration to make room. A capacity of zero is treated
    /// as one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            capacity: Some(capacity.max(1)),
        }
    }

    /// Register `index` under a freshly minted id and return the id.
    pub async fn register(&self, index: DocumentIndex) -> DocumentId {
        let id = Uuid::new_v4().to_string();
        let mut inner = self.inner.write().await;

        if let Some(capacity) = self.capacity {
            while inner.documents.len() >= capacity {
                match inner.registration_order.pop_front() {
                    Some(oldest) => {
                        inner.documents.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        inner.registration_order.push_back(id.clone());
        inner.documents.insert(id.clone(), Arc::new(index));
        id
    }

    /// Look up the index registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DocIntelError::DocumentNotFound`] if no document is
    /// registered under `id`.
    pub async fn lookup(&self, id: &str) -> Result<Arc<DocumentIndex>> {
        let inner = self.inner.read().await;
        inner
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| DocIntelError::DocumentNotFound(id.to_string()))
    }

    /// Remove the document registered under `id`. Removing an unknown id
    /// is a no-op.
    pub async fn remove(&self, id: &str) {
        let mut inner = self.inner.write().await;
        if inner.documents.remove(id).is_some() {
            inner.registration_order.retain(|existing| existing != id);
        }
    }

    /// Whether a document is registered under `id`.
    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.documents.contains_key(id)
    }

    /// Number of registered documents.
    pub async fn len(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.documents.is_empty()
    }
}
