//! Knowledge Store Port - Interface for the passage vector index.
//!
//! Stores passages with their embeddings in a single named collection and
//! answers nearest-neighbour queries over them.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::knowledge::{
    cosine_similarity, max_marginal_relevance, EmbeddedPassage, Passage,
};

#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Inserts passages, replacing any with the same id.
    ///
    /// # Errors
    /// `DimensionMismatch` when a vector's length differs from the
    /// collection's.
    async fn upsert(&self, passages: Vec<EmbeddedPassage>) -> Result<usize, KnowledgeStoreError>;

    /// Removes every passage in the collection.
    async fn delete_collection(&self) -> Result<(), KnowledgeStoreError>;

    /// Nearest passages to `query`, best first.
    async fn search(
        &self,
        query: &[f32],
        params: SearchParams,
    ) -> Result<Vec<SearchHit>, KnowledgeStoreError>;

    /// All stored passages in insertion order.
    async fn list(&self) -> Result<Vec<Passage>, KnowledgeStoreError>;

    async fn stats(&self) -> Result<StoreStats, KnowledgeStoreError>;
}

/// How a search picks its results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchMode {
    /// Top `k` by cosine similarity.
    Similarity,
    /// Max-marginal-relevance selection of `k` from the top `fetch_k`.
    Diverse { lambda: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub k: usize,
    pub fetch_k: usize,
    pub mode: SearchMode,
}

impl SearchParams {
    pub fn similarity(k: usize) -> Self {
        Self {
            k,
            fetch_k: k,
            mode: SearchMode::Similarity,
        }
    }

    pub fn diverse(k: usize, fetch_k: usize, lambda: f64) -> Self {
        Self {
            k,
            fetch_k: fetch_k.max(k),
            mode: SearchMode::Diverse { lambda },
        }
    }
}

/// A search result with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub passage: Passage,
    /// Cosine similarity to the query, in `[-1, 1]`.
    pub score: f64,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub collection: String,
    pub total_docs: usize,
    /// Vector length, or 0 for an empty collection.
    pub dimensions: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeStoreError {
    #[error("embedding has {actual} dimensions, collection expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("knowledge store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to serialize collection: {0}")]
    SerializationFailed(String),

    #[error("failed to deserialize collection: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for KnowledgeStoreError {
    fn from(err: std::io::Error) -> Self {
        KnowledgeStoreError::IoError(err.to_string())
    }
}

/// Ranks `entries` against `query` according to `params`.
///
/// Shared by the in-process adapters, which all search by brute force.
pub fn rank_entries(entries: &[EmbeddedPassage], query: &[f32], params: SearchParams) -> Vec<SearchHit> {
    if params.k == 0 || entries.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f64)> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| (index, cosine_similarity(query, &entry.embedding)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let selected: Vec<(usize, f64)> = match params.mode {
        SearchMode::Similarity => scored.into_iter().take(params.k).collect(),
        SearchMode::Diverse { lambda } => {
            let pool: Vec<(usize, f64)> = scored.into_iter().take(params.fetch_k.max(params.k)).collect();
            let vectors: Vec<&[f32]> = pool
                .iter()
                .map(|(index, _)| entries[*index].embedding.as_slice())
                .collect();
            max_marginal_relevance(query, &vectors, params.k, lambda)
                .into_iter()
                .map(|picked| pool[picked])
                .collect()
        }
    };

    selected
        .into_iter()
        .map(|(index, score)| SearchHit {
            passage: entries[index].passage.clone(),
            score,
            embedding: entries[index].embedding.clone(),
        })
        .collect()
}

/// Checks every vector against the collection's dimensionality.
///
/// `current` is the collection's existing dimensionality, if it has any
/// vectors; otherwise the first incoming vector sets it.
pub fn check_dimensions(
    current: Option<usize>,
    incoming: &[EmbeddedPassage],
) -> Result<Option<usize>, KnowledgeStoreError> {
    let mut expected = current;
    for entry in incoming {
        let actual = entry.embedding.len();
        match expected {
            Some(expected) if expected != actual => {
                return Err(KnowledgeStoreError::DimensionMismatch { expected, actual })
            }
            Some(_) => {}
            None => expected = Some(actual),
        }
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::PassageMetadata;

    fn entry(content: &str, embedding: Vec<f32>) -> EmbeddedPassage {
        EmbeddedPassage::new(Passage::derived("t", content, PassageMetadata::new()), embedding)
    }

    #[test]
    fn similarity_ranks_best_first() {
        let entries = vec![
            entry("far", vec![0.0, 1.0]),
            entry("near", vec![1.0, 0.1]),
            entry("exact", vec![1.0, 0.0]),
        ];
        let hits = rank_entries(&entries, &[1.0, 0.0], SearchParams::similarity(2));

        let contents: Vec<_> = hits.iter().map(|h| h.passage.content.as_str()).collect();
        assert_eq!(contents, vec!["exact", "near"]);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn diverse_prefers_spread_over_duplicates() {
        let entries = vec![
            entry("a", vec![1.0, 0.0]),
            entry("a-copy", vec![1.0, 0.0]),
            entry("b", vec![0.6, 0.8]),
        ];
        let hits = rank_entries(&entries, &[1.0, 0.2], SearchParams::diverse(2, 3, 0.5));

        let contents: Vec<_> = hits.iter().map(|h| h.passage.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[test]
    fn empty_store_yields_nothing() {
        assert!(rank_entries(&[], &[1.0], SearchParams::similarity(3)).is_empty());
    }

    #[test]
    fn dimension_check_rejects_mixed_lengths() {
        let incoming = vec![entry("a", vec![1.0, 0.0]), entry("b", vec![1.0])];
        assert!(matches!(
            check_dimensions(None, &incoming),
            Err(KnowledgeStoreError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert_eq!(check_dimensions(Some(2), &incoming[..1]).unwrap(), Some(2));
        assert!(check_dimensions(Some(3), &incoming[..1]).is_err());
    }
}
