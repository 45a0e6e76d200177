//! InspectPassages query handler - the admin view over the whole collection.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::knowledge::{keys, Passage};
use crate::ports::{KnowledgeStore, KnowledgeStoreError, StoreStats};

/// Number of contents returned by [`InspectPassagesHandler::overview`].
pub const OVERVIEW_SAMPLE_SIZE: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct InspectPassagesQuery {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring over content, keywords and project_ref.
    pub search: Option<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

/// A passage with its position in the unfiltered listing.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPassage {
    pub index: usize,
    pub passage: Passage,
}

#[derive(Debug, Clone)]
pub struct InspectPassagesResult {
    pub total_vectors: usize,
    pub filtered_count: usize,
    /// Sorted, unique categories across the whole collection.
    pub categories: Vec<String>,
    /// The requested page of matching passages.
    pub passages: Vec<IndexedPassage>,
    pub stats: StoreStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionOverview {
    pub total: usize,
    pub categories: Vec<String>,
    pub sample: Vec<String>,
}

pub struct InspectPassagesHandler {
    store: Arc<dyn KnowledgeStore>,
}

impl InspectPassagesHandler {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: InspectPassagesQuery,
    ) -> Result<InspectPassagesResult, KnowledgeStoreError> {
        let all = self.store.list().await?;
        let stats = self.store.stats().await?;
        let categories = unique_categories(&all);
        let total_vectors = all.len();

        let category = query.category.as_deref().filter(|c| !c.is_empty());
        let search = query
            .search
            .as_deref()
            .map(str::to_lowercase)
            .filter(|s| !s.is_empty());

        let matching: Vec<IndexedPassage> = all
            .into_iter()
            .enumerate()
            .filter(|(_, p)| category.map_or(true, |c| p.category() == c))
            .filter(|(_, p)| search.as_deref().map_or(true, |s| matches_search(p, s)))
            .map(|(index, passage)| IndexedPassage { index, passage })
            .collect();

        let filtered_count = matching.len();
        let passages = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(InspectPassagesResult {
            total_vectors,
            filtered_count,
            categories,
            passages,
            stats,
        })
    }

    /// Totals, categories and the first few contents.
    pub async fn overview(&self) -> Result<CollectionOverview, KnowledgeStoreError> {
        let all = self.store.list().await?;
        Ok(CollectionOverview {
            total: all.len(),
            categories: unique_categories(&all),
            sample: all
                .iter()
                .take(OVERVIEW_SAMPLE_SIZE)
                .map(|p| p.content.clone())
                .collect(),
        })
    }
}

fn unique_categories(passages: &[Passage]) -> Vec<String> {
    passages
        .iter()
        .map(|p| p.category().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn matches_search(passage: &Passage, needle: &str) -> bool {
    passage.content.to_lowercase().contains(needle)
        || passage
            .metadata
            .rendered(keys::KEYWORDS)
            .to_lowercase()
            .contains(needle)
        || passage
            .metadata
            .rendered(keys::PROJECT_REF)
            .to_lowercase()
            .contains(needle)
}
