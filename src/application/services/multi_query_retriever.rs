//! Multi-query retrieval with diversity re-ranking.
//!
//! The query is expanded into alternative phrasings by the language model,
//! every phrasing is searched for `fetch_k` similarity candidates, the pool
//! is deduplicated by content, and maximal marginal relevance picks the
//! final `k` against the original query's embedding.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::knowledge::{max_marginal_relevance, Passage};
use crate::domain::orchestrator::prompts::query_expansion_prompt;
use crate::domain::orchestrator::{RetrievalError, Retriever};
use crate::ports::{
    ChatMessage, CompletionRequest, Embedder, KnowledgeStore, LanguageModel, SearchHit,
    SearchParams,
};

pub const DEFAULT_K: usize = 6;
pub const DEFAULT_FETCH_K: usize = 20;
pub const DEFAULT_LAMBDA: f64 = 0.5;
pub const DEFAULT_EXPANSION_QUERIES: usize = 3;

const EXPANSION_MAX_TOKENS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrieverSettings {
    pub k: usize,
    pub fetch_k: usize,
    pub lambda: f64,
    pub expansion_queries: usize,
}

impl Default for RetrieverSettings {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            fetch_k: DEFAULT_FETCH_K,
            lambda: DEFAULT_LAMBDA,
            expansion_queries: DEFAULT_EXPANSION_QUERIES,
        }
    }
}

pub struct MultiQueryRetriever {
    model: Arc<dyn LanguageModel>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn KnowledgeStore>,
    settings: RetrieverSettings,
}

impl MultiQueryRetriever {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn KnowledgeStore>,
        settings: RetrieverSettings,
    ) -> Self {
        Self {
            model,
            embedder,
            store,
            settings,
        }
    }

    /// The original query followed by up to `expansion_queries` distinct
    /// paraphrases. Expansion failures leave only the original.
    async fn expand(&self, query: &str) -> Vec<String> {
        let mut queries = vec![query.to_string()];
        if self.settings.expansion_queries == 0 {
            return queries;
        }

        let request = CompletionRequest::new()
            .with_messages([ChatMessage::user(query_expansion_prompt(
                query,
                self.settings.expansion_queries,
            ))])
            .with_max_tokens(EXPANSION_MAX_TOKENS);

        match self.model.complete(request).await {
            Ok(response) => {
                let mut seen: HashSet<String> = HashSet::from([query.to_lowercase()]);
                let paraphrases = parse_expansion_lines(&response.content)
                    .into_iter()
                    .filter(|line| seen.insert(line.to_lowercase()))
                    .take(self.settings.expansion_queries);
                queries.extend(paraphrases);
            }
            Err(err) => {
                tracing::warn!(error = %err, "query expansion failed, searching original query only");
            }
        }
        queries
    }
}

/// Splits model output into one query per line, dropping list markers.
fn parse_expansion_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | ')' | '-' | '*'))
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Merges candidate lists, keeping the first hit for each distinct content.
fn merge_unique(batches: Vec<Vec<SearchHit>>) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|hit| seen.insert(hit.passage.content.clone()))
        .collect()
}

#[async_trait]
impl Retriever for MultiQueryRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }

        let queries = self.expand(query).await;

        let embeddings = match self.embedder.embed(&queries).await {
            Ok(embeddings) if embeddings.len() == queries.len() => embeddings,
            Ok(embeddings) => {
                tracing::warn!(
                    expected = queries.len(),
                    actual = embeddings.len(),
                    "embedder returned wrong vector count, returning no passages"
                );
                return Ok(Vec::new());
            }
            Err(err) => {
                tracing::warn!(error = %err, "query embedding failed, returning no passages");
                return Ok(Vec::new());
            }
        };

        let searches = embeddings.iter().map(|embedding| {
            self.store
                .search(embedding, SearchParams::similarity(self.settings.fetch_k))
        });
        let batches = match try_join_all(searches).await {
            Ok(batches) => batches,
            Err(err) => {
                tracing::warn!(error = %err, "knowledge store search failed, returning no passages");
                return Ok(Vec::new());
            }
        };

        let pool = merge_unique(batches);
        let candidates: Vec<&[f32]> = pool.iter().map(|hit| hit.embedding.as_slice()).collect();
        let selected = max_marginal_relevance(
            &embeddings[0],
            &candidates,
            self.settings.k,
            self.settings.lambda,
        );

        tracing::debug!(
            queries = queries.len(),
            candidates = pool.len(),
            selected = selected.len(),
            "retrieval completed"
        );

        Ok(selected
            .into_iter()
            .map(|index| pool[index].passage.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockError, MockLanguageModel};
    use crate::adapters::embedding::HashingEmbedder;
    use crate::adapters::knowledge::InMemoryKnowledgeStore;
    use crate::domain::knowledge::{EmbeddedPassage, PassageMetadata};

    async fn seeded_store(embedder: &HashingEmbedder, contents: &[&str]) -> Arc<InMemoryKnowledgeStore> {
        let store = Arc::new(InMemoryKnowledgeStore::new("test"));
        let passages = contents
            .iter()
            .map(|c| {
                EmbeddedPassage::new(
                    Passage::derived("test", *c, PassageMetadata::new()),
                    embedder.embed_text(c),
                )
            })
            .collect();
        store.upsert(passages).await.unwrap();
        store
    }

    fn retriever(
        model: MockLanguageModel,
        store: Arc<InMemoryKnowledgeStore>,
        settings: RetrieverSettings,
    ) -> MultiQueryRetriever {
        MultiQueryRetriever::new(
            Arc::new(model),
            Arc::new(HashingEmbedder::default()),
            store,
            settings,
        )
    }

    fn with_k(k: usize) -> RetrieverSettings {
        RetrieverSettings {
            k,
            ..RetrieverSettings::default()
        }
    }

    #[test]
    fn expansion_lines_drop_numbering() {
        let lines = parse_expansion_lines("1. first\n\n- second\n  third  ");
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn empty_query_is_an_error() {
        let store = Arc::new(InMemoryKnowledgeStore::new("test"));
        let r = retriever(MockLanguageModel::new(), store, RetrieverSettings::default());
        assert!(matches!(r.retrieve("   ").await, Err(RetrievalError::EmptyQuery)));
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = Arc::new(InMemoryKnowledgeStore::new("test"));
        let r = retriever(MockLanguageModel::new(), store, with_k(3));
        assert!(r.retrieve("react dashboards").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn finds_verbatim_passage_and_respects_k() {
        let embedder = HashingEmbedder::default();
        let store = seeded_store(
            &embedder,
            &[
                "We built a multi-tenant SaaS dashboard in React and Node.js",
                "Our team delivered a Shopify storefront for a fashion brand",
                "Kubernetes migration for a logistics company on AWS",
                "Flutter mobile app for appointment booking",
            ],
        )
        .await;
        let model = MockLanguageModel::new()
            .with_response("React SaaS dashboard projects\nmulti-tenant dashboards built with React");
        let r = retriever(model, store, with_k(2));

        let passages = r
            .retrieve("multi-tenant SaaS dashboard in React")
            .await
            .unwrap();

        assert!(passages.len() <= 2);
        assert!(passages
            .iter()
            .any(|p| p.content.contains("multi-tenant SaaS dashboard")));
    }

    #[tokio::test]
    async fn expansion_failure_still_searches_original() {
        let embedder = HashingEmbedder::default();
        let store = seeded_store(&embedder, &["Shopify storefront for a fashion brand"]).await;
        let model = MockLanguageModel::new().with_error(MockError::Unavailable {
            message: "down".into(),
        });
        let r = retriever(model, store, RetrieverSettings::default());

        let passages = r.retrieve("Shopify storefront").await.unwrap();
        assert_eq!(passages.len(), 1);
    }

    #[tokio::test]
    async fn duplicates_across_queries_are_merged() {
        let embedder = HashingEmbedder::default();
        let store = seeded_store(&embedder, &["alpha beta", "gamma delta"]).await;
        let model = MockLanguageModel::new().with_response("alpha beta\nalpha\nbeta");
        let r = retriever(model, store, RetrieverSettings::default());

        let passages = r.retrieve("alpha beta").await.unwrap();
        let unique: HashSet<&str> = passages.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(unique.len(), passages.len());
    }

    #[tokio::test]
    async fn expansion_is_skipped_when_disabled() {
        let store = Arc::new(InMemoryKnowledgeStore::new("test"));
        let model = Arc::new(MockLanguageModel::new());
        let r = MultiQueryRetriever::new(
            model.clone(),
            Arc::new(HashingEmbedder::default()),
            store,
            RetrieverSettings {
                expansion_queries: 0,
                ..RetrieverSettings::default()
            },
        );
        r.retrieve("anything").await.unwrap();
        assert_eq!(model.call_count(), 0);
    }
}
