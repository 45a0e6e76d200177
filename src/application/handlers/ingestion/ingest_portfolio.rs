//! IngestPortfolio command handler.
//!
//! Section strategy: every portfolio page section becomes context-injected
//! chunks, optionally with an LLM-written summary passage alongside.

use std::path::PathBuf;
use std::sync::Arc;

use super::indexing::{load_sources, replace_collection, IngestionError, IngestionReport};
use crate::domain::ingestion::{SectionDocument, TextSplitter};
use crate::domain::knowledge::Passage;
use crate::ports::{ChatMessage, CompletionRequest, Embedder, KnowledgeStore, LanguageModel};

const SUMMARY_MAX_TOKENS: u32 = 200;

#[derive(Debug, Clone)]
pub struct IngestPortfolioCommand {
    pub sources: Vec<PathBuf>,
    /// Also index a 2-3 sentence summary of each section.
    pub summarize: bool,
}

pub struct IngestPortfolioHandler {
    model: Arc<dyn LanguageModel>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn KnowledgeStore>,
    splitter: TextSplitter,
}

impl IngestPortfolioHandler {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn KnowledgeStore>,
        splitter: TextSplitter,
    ) -> Self {
        Self {
            model,
            embedder,
            store,
            splitter,
        }
    }

    pub async fn handle(
        &self,
        command: IngestPortfolioCommand,
    ) -> Result<IngestionReport, IngestionError> {
        let sources = load_sources(&command.sources).await;
        if sources.is_empty() {
            return Err(IngestionError::NoSources);
        }

        let mut passages = Vec::new();
        for (path, records) in sources {
            for record in records {
                let documents = record.section_documents();
                tracing::debug!(
                    source = %path.display(),
                    project = %record.title,
                    sections = documents.len(),
                    "chunking record"
                );
                for document in &documents {
                    passages.extend(document.chunk(&self.splitter));
                    if command.summarize {
                        if let Some(summary) = self.summarize(document).await {
                            passages.push(summary);
                        }
                    }
                }
            }
        }

        tracing::info!(passages = passages.len(), "section chunks prepared");
        replace_collection(self.embedder.as_ref(), self.store.as_ref(), passages).await
    }

    async fn summarize(&self, document: &SectionDocument) -> Option<Passage> {
        let request = CompletionRequest::new()
            .with_messages([ChatMessage::user(document.summary_prompt())])
            .with_max_tokens(SUMMARY_MAX_TOKENS)
            .with_temperature(0.0);

        match self.model.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                Some(document.summary_passage(&response.content))
            }
            Ok(_) => {
                tracing::warn!(section = %document.heading, "empty section summary, skipping");
                None
            }
            Err(err) => {
                tracing::warn!(section = %document.heading, error = %err, "section summary failed, skipping");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockError, MockLanguageModel};
    use crate::adapters::embedding::HashingEmbedder;
    use crate::adapters::knowledge::InMemoryKnowledgeStore;
    use crate::domain::knowledge::keys;
    use tempfile::TempDir;

    const RECORD: &str = r#"{
        "url": "https://example.test/portfolio/fleet-tracker/",
        "title": "Fleet Tracker",
        "sections": [
            {"heading": "Overview", "content": "A real-time logistics dashboard built with React and Node.js, deployed on AWS."},
            {"heading": "Contact Us", "content": "Talk to our team about your next project today."},
            {"heading": "Short", "content": "tiny"}
        ]
    }"#;

    fn write_record(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("fleet.json");
        std::fs::write(&path, RECORD).unwrap();
        path
    }

    fn handler(model: MockLanguageModel, store: Arc<InMemoryKnowledgeStore>) -> IngestPortfolioHandler {
        IngestPortfolioHandler::new(
            Arc::new(model),
            Arc::new(HashingEmbedder::default()),
            store,
            TextSplitter::default(),
        )
    }

    #[tokio::test]
    async fn indexes_only_substantive_sections() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(InMemoryKnowledgeStore::new("portfolio"));
        let report = handler(MockLanguageModel::new(), store.clone())
            .handle(IngestPortfolioCommand {
                sources: vec![write_record(&dir)],
                summarize: false,
            })
            .await
            .unwrap();

        assert_eq!(report.total_passages, 1);
        let passages = store.list().await.unwrap();
        assert_eq!(passages[0].metadata.text(keys::PROJECT_SLUG), Some("fleet-tracker"));
        assert!(passages[0].content.contains("Project: Fleet Tracker"));
    }

    #[tokio::test]
    async fn summaries_are_added_when_requested() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(InMemoryKnowledgeStore::new("portfolio"));
        let model = MockLanguageModel::new().with_response("A live logistics dashboard for fleets.");
        let report = handler(model, store.clone())
            .handle(IngestPortfolioCommand {
                sources: vec![write_record(&dir)],
                summarize: true,
            })
            .await
            .unwrap();

        assert_eq!(report.total_passages, 2);
        let summaries = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.metadata.rendered(keys::IS_SUMMARY) == "true")
            .count();
        assert_eq!(summaries, 1);
    }

    #[tokio::test]
    async fn failed_summary_is_skipped() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(InMemoryKnowledgeStore::new("portfolio"));
        let model = MockLanguageModel::new().with_error(MockError::Network {
            message: "reset".into(),
        });
        let report = handler(model, store)
            .handle(IngestPortfolioCommand {
                sources: vec![write_record(&dir)],
                summarize: true,
            })
            .await
            .unwrap();

        assert_eq!(report.total_passages, 1);
    }

    #[tokio::test]
    async fn no_readable_sources_is_an_error() {
        let store = Arc::new(InMemoryKnowledgeStore::new("portfolio"));
        let result = handler(MockLanguageModel::new(), store)
            .handle(IngestPortfolioCommand {
                sources: vec![PathBuf::from("/nonexistent/portfolio.json")],
                summarize: false,
            })
            .await;
        assert!(matches!(result, Err(IngestionError::NoSources)));
    }
}
