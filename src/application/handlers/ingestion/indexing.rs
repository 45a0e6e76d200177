//! Shared indexing tail of both ingestion strategies: read sources, embed,
//! replace the collection, report and probe.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ingestion::{parse_records, PortfolioRecord, MASTER_TAXONOMY};
use crate::domain::knowledge::{EmbeddedPassage, Passage};
use crate::ports::{
    Embedder, EmbeddingError, KnowledgeStore, KnowledgeStoreError, SearchParams,
};

/// Candidates considered by each post-ingestion probe.
const PROBE_FETCH_K: usize = 20;
const PROBE_K: usize = 2;
const PROBE_LAMBDA: f64 = 0.5;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("no readable portfolio records in the given sources")]
    NoSources,

    #[error("ingestion produced no passages")]
    NoPassages,

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("knowledge store failed: {0}")]
    Store(#[from] KnowledgeStoreError),
}

/// Whether a category's canned question finds that category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub category: String,
    pub question: String,
    pub hit: bool,
    pub retrieved_categories: Vec<String>,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub collection: String,
    pub total_passages: usize,
    pub by_category: BTreeMap<String, usize>,
    pub probes: Vec<ProbeResult>,
}

/// Reads every source, logging and skipping the unreadable ones.
pub(crate) async fn load_sources(sources: &[PathBuf]) -> Vec<(PathBuf, Vec<PortfolioRecord>)> {
    let mut loaded = Vec::new();
    for path in sources {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable source");
                continue;
            }
        };
        match parse_records(&raw) {
            Ok(records) => {
                tracing::info!(path = %path.display(), records = records.len(), "loaded source");
                loaded.push((path.clone(), records));
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unparseable source");
            }
        }
    }
    loaded
}

/// Embeds `passages`, replaces the collection with them and reports.
pub(crate) async fn replace_collection(
    embedder: &dyn Embedder,
    store: &dyn KnowledgeStore,
    passages: Vec<Passage>,
) -> Result<IngestionReport, IngestionError> {
    if passages.is_empty() {
        return Err(IngestionError::NoPassages);
    }

    let texts: Vec<String> = passages.iter().map(|p| p.content.clone()).collect();
    let embeddings = embedder.embed(&texts).await?;
    if embeddings.len() != passages.len() {
        return Err(EmbeddingError::CountMismatch {
            expected: passages.len(),
            actual: embeddings.len(),
        }
        .into());
    }

    let entries: Vec<EmbeddedPassage> = passages
        .into_iter()
        .zip(embeddings)
        .map(|(passage, embedding)| EmbeddedPassage::new(passage, embedding))
        .collect();

    store.delete_collection().await?;
    let written = store.upsert(entries).await?;
    tracing::info!(written, "collection replaced");

    let stored = store.list().await?;
    let mut by_category = BTreeMap::new();
    for passage in &stored {
        *by_category.entry(passage.category().to_string()).or_insert(0) += 1;
    }

    let probes = probe(embedder, store).await?;
    let stats = store.stats().await?;

    Ok(IngestionReport {
        collection: stats.collection,
        total_passages: stored.len(),
        by_category,
        probes,
    })
}

/// Asks each category's canned question and checks the top results.
async fn probe(
    embedder: &dyn Embedder,
    store: &dyn KnowledgeStore,
) -> Result<Vec<ProbeResult>, IngestionError> {
    let mut results = Vec::with_capacity(MASTER_TAXONOMY.len());
    for category in MASTER_TAXONOMY.iter() {
        let query = embedder.embed_query(category.probe).await?;
        let hits = store
            .search(&query, SearchParams::diverse(PROBE_K, PROBE_FETCH_K, PROBE_LAMBDA))
            .await?;
        let retrieved_categories: Vec<String> = hits
            .iter()
            .map(|hit| hit.passage.category().to_string())
            .collect();
        let hit = retrieved_categories.iter().any(|c| c == category.name);
        tracing::info!(category = category.name, hit, "retrieval probe");
        results.push(ProbeResult {
            category: category.name.to_string(),
            question: category.probe.to_string(),
            hit,
            retrieved_categories,
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::embedding::HashingEmbedder;
    use crate::adapters::knowledge::InMemoryKnowledgeStore;
    use crate::domain::knowledge::PassageMetadata;
    use tempfile::TempDir;

    fn passage(content: &str, category: &str) -> Passage {
        Passage::derived("t", content, PassageMetadata::new().with("category", category))
    }

    #[tokio::test]
    async fn report_counts_categories() {
        let embedder = HashingEmbedder::default();
        let store = InMemoryKnowledgeStore::new("portfolio");

        let report = replace_collection(
            &embedder,
            &store,
            vec![
                passage("React and Node.js platform", "Technical_Capability"),
                passage("Fintech compliance dashboards", "Domain_Expertise"),
                passage("Shopify migration", "Technical_Capability"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(report.total_passages, 3);
        assert_eq!(report.by_category["Technical_Capability"], 2);
        assert_eq!(report.probes.len(), MASTER_TAXONOMY.len());
        assert_eq!(report.collection, "portfolio");
    }

    #[tokio::test]
    async fn rerun_replaces_rather_than_appends() {
        let embedder = HashingEmbedder::default();
        let store = InMemoryKnowledgeStore::new("portfolio");
        let passages = vec![passage("one", "A"), passage("two", "B")];

        let first = replace_collection(&embedder, &store, passages.clone()).await.unwrap();
        let second = replace_collection(&embedder, &store, passages).await.unwrap();

        assert_eq!(first.total_passages, second.total_passages);
        assert_eq!(first.by_category, second.by_category);
    }

    #[tokio::test]
    async fn empty_input_keeps_existing_collection() {
        let embedder = HashingEmbedder::default();
        let store = InMemoryKnowledgeStore::new("portfolio");
        replace_collection(&embedder, &store, vec![passage("one", "A")]).await.unwrap();

        let result = replace_collection(&embedder, &store, Vec::new()).await;
        assert!(matches!(result, Err(IngestionError::NoPassages)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unreadable_sources_are_skipped() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        std::fs::write(&good, r#"{"title":"Site","sections":[]}"#).unwrap();
        std::fs::write(&bad, "{ nope").unwrap();

        let loaded = load_sources(&[good.clone(), bad, dir.path().join("missing.json")]).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0, good);
    }
}
