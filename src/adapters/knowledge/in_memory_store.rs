//! In-Memory Knowledge Store Adapter
//!
//! Keeps embedded passages in a vector behind a read-write lock and
//! searches them by brute force. Useful for tests and small corpora.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::knowledge::{EmbeddedPassage, Passage};
use crate::ports::{
    check_dimensions, rank_entries, KnowledgeStore, KnowledgeStoreError, SearchHit, SearchParams,
    StoreStats,
};

#[derive(Debug, Default)]
pub(crate) struct Collection {
    pub(crate) dimensions: Option<usize>,
    pub(crate) entries: Vec<EmbeddedPassage>,
}

impl Collection {
    pub(crate) fn from_entries(entries: Vec<EmbeddedPassage>) -> Self {
        let dimensions = entries.first().map(|e| e.embedding.len());
        Self { dimensions, entries }
    }

    /// Inserts or replaces by passage id. Returns the number written.
    pub(crate) fn upsert(
        &mut self,
        passages: Vec<EmbeddedPassage>,
    ) -> Result<usize, KnowledgeStoreError> {
        self.dimensions = check_dimensions(self.dimensions, &passages)?;

        let written = passages.len();
        for passage in passages {
            match self
                .entries
                .iter_mut()
                .find(|e| e.passage.id == passage.passage.id)
            {
                Some(existing) => *existing = passage,
                None => self.entries.push(passage),
            }
        }
        Ok(written)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.dimensions = None;
    }

    pub(crate) fn stats(&self, name: &str) -> StoreStats {
        StoreStats {
            collection: name.to_string(),
            total_docs: self.entries.len(),
            dimensions: self.dimensions.unwrap_or(0),
        }
    }
}

/// In-memory passage index for one collection
#[derive(Debug, Clone)]
pub struct InMemoryKnowledgeStore {
    name: String,
    collection: Arc<RwLock<Collection>>,
}

impl InMemoryKnowledgeStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            name: collection.into(),
            collection: Arc::new(RwLock::new(Collection::default())),
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.name
    }

    /// Number of stored passages
    pub async fn len(&self) -> usize {
        self.collection.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn upsert(&self, passages: Vec<EmbeddedPassage>) -> Result<usize, KnowledgeStoreError> {
        self.collection.write().await.upsert(passages)
    }

    async fn delete_collection(&self) -> Result<(), KnowledgeStoreError> {
        self.collection.write().await.clear();
        Ok(())
    }

    async fn search(
        &self,
        query: &[f32],
        params: SearchParams,
    ) -> Result<Vec<SearchHit>, KnowledgeStoreError> {
        let collection = self.collection.read().await;
        if let Some(expected) = collection.dimensions {
            if expected != query.len() {
                return Err(KnowledgeStoreError::DimensionMismatch {
                    expected,
                    actual: query.len(),
                });
            }
        }
        Ok(rank_entries(&collection.entries, query, params))
    }

    async fn list(&self) -> Result<Vec<Passage>, KnowledgeStoreError> {
        let collection = self.collection.read().await;
        Ok(collection.entries.iter().map(|e| e.passage.clone()).collect())
    }

    async fn stats(&self) -> Result<StoreStats, KnowledgeStoreError> {
        Ok(self.collection.read().await.stats(&self.name))
    }
}
