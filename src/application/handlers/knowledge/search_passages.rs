//! SearchPassages query handler - plain semantic search over the collection.

use std::sync::Arc;
use thiserror::Error;

use crate::ports::{
    Embedder, EmbeddingError, KnowledgeStore, KnowledgeStoreError, SearchHit, SearchParams,
};

pub const DEFAULT_SEARCH_K: usize = 5;
pub const MAX_SEARCH_K: usize = 50;

#[derive(Debug, Clone)]
pub struct SearchPassagesQuery {
    pub query: String,
    pub k: usize,
}

#[derive(Debug, Error)]
pub enum SearchPassagesError {
    #[error("search query is empty")]
    EmptyQuery,

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("knowledge store failed: {0}")]
    Store(#[from] KnowledgeStoreError),
}

pub struct SearchPassagesHandler {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn KnowledgeStore>,
}

impl SearchPassagesHandler {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn KnowledgeStore>) -> Self {
        Self { embedder, store }
    }

    /// Top `k` passages by cosine similarity, `k` clamped to `1..=MAX_SEARCH_K`.
    pub async fn handle(
        &self,
        query: SearchPassagesQuery,
    ) -> Result<Vec<SearchHit>, SearchPassagesError> {
        let text = query.query.trim();
        if text.is_empty() {
            return Err(SearchPassagesError::EmptyQuery);
        }
        let k = query.k.clamp(1, MAX_SEARCH_K);

        let embedding = self.embedder.embed_query(text).await?;
        let hits = self
            .store
            .search(&embedding, SearchParams::similarity(k))
            .await?;
        tracing::debug!(k, hits = hits.len(), "semantic search");
        Ok(hits)
    }
}
