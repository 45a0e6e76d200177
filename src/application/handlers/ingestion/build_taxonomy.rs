//! BuildTaxonomy command handler.
//!
//! Taxonomy strategy: one LLM extraction per master category over the whole
//! portfolio, validated into exactly one chunk per category (placeholders
//! for categories the model could not cover).

use std::path::PathBuf;
use std::sync::Arc;

use super::indexing::{load_sources, replace_collection, IngestionError, IngestionReport};
use crate::domain::foundation::Timestamp;
use crate::domain::ingestion::{
    extraction_prompt, extraction_schema, validate_evidence, ExtractedEvidence, PortfolioRecord,
    TaxonomyCategory, MASTER_TAXONOMY,
};
use crate::domain::orchestrator::prompts::DEFAULT_ORGANIZATION;
use crate::ports::{
    invoke_structured, ChatMessage, CompletionRequest, Embedder, KnowledgeStore, LanguageModel,
};

const SCHEMA_NAME: &str = "taxonomy_evidence";
const EXTRACTION_MAX_TOKENS: u32 = 600;

#[derive(Debug, Clone)]
pub struct BuildTaxonomyCommand {
    pub sources: Vec<PathBuf>,
}

pub struct BuildTaxonomyHandler {
    model: Arc<dyn LanguageModel>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn KnowledgeStore>,
    organization: String,
}

impl BuildTaxonomyHandler {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn KnowledgeStore>,
    ) -> Self {
        Self {
            model,
            embedder,
            store,
            organization: DEFAULT_ORGANIZATION.to_string(),
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    pub async fn handle(
        &self,
        command: BuildTaxonomyCommand,
    ) -> Result<IngestionReport, IngestionError> {
        let sources = load_sources(&command.sources).await;
        if sources.is_empty() {
            return Err(IngestionError::NoSources);
        }

        let source_label = sources
            .iter()
            .map(|(path, _)| path.display().to_string())
            .collect::<Vec<_>>()
            .join(",");
        let records: Vec<PortfolioRecord> =
            sources.into_iter().flat_map(|(_, records)| records).collect();
        let portfolio_json = serde_json::to_string_pretty(&records).unwrap_or_default();

        let mut extracted = Vec::with_capacity(MASTER_TAXONOMY.len());
        for category in MASTER_TAXONOMY.iter() {
            extracted.push(self.extract(category, &portfolio_json).await);
        }

        let created_at = Timestamp::now().to_rfc3339();
        let passages = validate_evidence(extracted)
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| chunk.into_passage(index, &created_at, &source_label))
            .collect();

        replace_collection(self.embedder.as_ref(), self.store.as_ref(), passages).await
    }

    async fn extract(&self, category: &TaxonomyCategory, portfolio_json: &str) -> ExtractedEvidence {
        let request = CompletionRequest::new()
            .with_messages([ChatMessage::user(extraction_prompt(
                category,
                &self.organization,
                portfolio_json,
            ))])
            .with_temperature(0.0)
            .with_max_tokens(EXTRACTION_MAX_TOKENS)
            .with_json_schema(SCHEMA_NAME, extraction_schema());

        match invoke_structured::<ExtractedEvidence>(self.model.as_ref(), request).await {
            Ok((evidence, _usage)) => {
                tracing::info!(category = category.name, "taxonomy evidence extracted");
                evidence
            }
            Err(err) => {
                tracing::warn!(category = category.name, error = %err, "taxonomy extraction failed, using fallback");
                ExtractedEvidence::fallback(category)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockLanguageModel;
    use crate::adapters::embedding::HashingEmbedder;
    use crate::adapters::knowledge::InMemoryKnowledgeStore;
    use crate::domain::knowledge::keys;
    use tempfile::TempDir;

    fn source(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("portfolio.json");
        std::fs::write(
            &path,
            r#"[{"title":"Fleet Tracker","sections":[{"heading":"Overview","content":"Realtime React dashboard on AWS."}]}]"#,
        )
        .unwrap();
        path
    }

    fn handler(model: MockLanguageModel, store: Arc<InMemoryKnowledgeStore>) -> BuildTaxonomyHandler {
        BuildTaxonomyHandler::new(Arc::new(model), Arc::new(HashingEmbedder::default()), store)
    }

    #[tokio::test]
    async fn one_chunk_per_category() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(InMemoryKnowledgeStore::new("portfolio"));
        let model = MockLanguageModel::new().with_response(
            r#"{"content":"Fleet Tracker is a realtime React dashboard on AWS.","metadata":{"category":"Technical_Capability","sub_type":"Frontend","keywords":["React","AWS"],"project_ref":"Fleet Tracker"}}"#,
        );

        let report = handler(model, store.clone())
            .handle(BuildTaxonomyCommand {
                sources: vec![source(&dir)],
            })
            .await
            .unwrap();

        assert_eq!(report.total_passages, MASTER_TAXONOMY.len());
        for category in MASTER_TAXONOMY.iter() {
            assert_eq!(report.by_category[category.name], 1);
        }

        let passages = store.list().await.unwrap();
        let capability = passages
            .iter()
            .find(|p| p.category() == "Technical_Capability")
            .unwrap();
        assert_eq!(capability.metadata.text(keys::PROJECT_REF), Some("Fleet Tracker"));
        assert_eq!(capability.metadata.rendered(keys::KEYWORDS), "React, AWS");
    }

    #[tokio::test]
    async fn rebuild_is_stable() {
        let dir = TempDir::new().unwrap();
        let path = source(&dir);
        let store = Arc::new(InMemoryKnowledgeStore::new("portfolio"));

        let first = handler(MockLanguageModel::new(), store.clone())
            .handle(BuildTaxonomyCommand {
                sources: vec![path.clone()],
            })
            .await
            .unwrap();
        let second = handler(MockLanguageModel::new(), store)
            .handle(BuildTaxonomyCommand {
                sources: vec![path],
            })
            .await
            .unwrap();

        assert_eq!(first.total_passages, second.total_passages);
        assert_eq!(first.by_category, second.by_category);
    }
}
