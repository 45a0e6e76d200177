//! Start-up wiring from [`AppConfig`] to concrete services.
//!
//! Every adapter is chosen here, once, and handed to the layers that need
//! it as a trait object. Nothing below this module reads configuration.

use std::sync::Arc;

use axum::Router;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

use crate::adapters::ai::{MockLanguageModel, MockResponse, OpenAIConfig, OpenAIProvider};
use crate::adapters::embedding::{HashingEmbedder, OpenAIEmbedder, OpenAIEmbedderConfig};
use crate::adapters::http::{app_router, ChatAppState, KnowledgeAppState};
use crate::adapters::knowledge::{FileKnowledgeStore, InMemoryKnowledgeStore};
use crate::adapters::storage::{FileCheckpointStore, InMemoryCheckpointStore};
use crate::application::handlers::conversation::{ConversationOrchestrator, OrchestratorSettings};
use crate::application::handlers::ingestion::{BuildTaxonomyHandler, IngestPortfolioHandler};
use crate::application::handlers::knowledge::{InspectPassagesHandler, SearchPassagesHandler};
use crate::application::services::{
    GeneratorSettings, LlmIntentClassifier, LlmResponseGenerator, MultiQueryRetriever,
};
use crate::config::{
    AppConfig, ChatProvider, CheckpointBackend, ClassifierKind, EmbeddingProvider, StoreBackend,
};
use crate::domain::ingestion::TextSplitter;
use crate::domain::orchestrator::{IntentClassifier, KeywordIntentClassifier};
use crate::ports::{
    CheckpointStore, Embedder, EmbeddingError, KnowledgeStore, KnowledgeStoreError, LanguageModel,
    LlmError,
};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("OPENAI_API_KEY is required for the selected providers")]
    MissingApiKey,

    #[error("language model setup failed: {0}")]
    Model(#[from] LlmError),

    #[error("embedder setup failed: {0}")]
    Embedder(#[from] EmbeddingError),

    #[error("knowledge store setup failed: {0}")]
    Store(#[from] KnowledgeStoreError),
}

/// Every long-lived service the binary needs.
#[derive(Clone)]
pub struct Services {
    pub chat_model: Arc<dyn LanguageModel>,
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn KnowledgeStore>,
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub orchestrator: ConversationOrchestrator,
    config: AppConfig,
}

impl Services {
    pub async fn build(config: &AppConfig) -> Result<Self, BootstrapError> {
        let offline = config.ai.chat_provider == ChatProvider::Mock;

        let chat_model = build_chat_model(config, &config.ai.chat_model)?;
        let classifier_model = if config.ai.classifier_model() == config.ai.chat_model {
            Arc::clone(&chat_model)
        } else {
            build_chat_model(config, config.ai.classifier_model())?
        };
        let embedder = build_embedder(config)?;
        let store = build_knowledge_store(config).await?;
        let checkpoints = build_checkpoint_store(config);

        // The offline model answers every prompt with the same notice, so it
        // can neither classify nor paraphrase queries.
        let classifier: Arc<dyn IntentClassifier> = match config.conversation.classifier {
            ClassifierKind::Llm if !offline => Arc::new(LlmIntentClassifier::new(classifier_model)),
            ClassifierKind::Llm => {
                tracing::info!("mock chat provider selected, using the keyword classifier");
                Arc::new(KeywordIntentClassifier)
            }
            ClassifierKind::Keyword => Arc::new(KeywordIntentClassifier),
        };

        let mut retriever_settings = config.retrieval.retriever_settings();
        if offline {
            retriever_settings.expansion_queries = 0;
        }
        let retriever = Arc::new(MultiQueryRetriever::new(
            Arc::clone(&chat_model),
            Arc::clone(&embedder),
            Arc::clone(&store),
            retriever_settings,
        ));

        let generator = Arc::new(LlmResponseGenerator::new(
            Arc::clone(&chat_model),
            GeneratorSettings {
                organization: config.conversation.organization_name.clone(),
                contact_channel: config.conversation.contact_channel.clone(),
                max_reply_tokens: config.ai.max_reply_tokens,
                temperature: config.ai.temperature,
            },
        ));

        let orchestrator = ConversationOrchestrator::new(
            classifier,
            retriever,
            generator,
            Arc::clone(&checkpoints),
            OrchestratorSettings {
                stage_timeout: config.conversation.stage_timeout(),
                grounding_limit: config.retrieval.grounding_limit,
                contact_channel: config.conversation.contact_channel.clone(),
            },
        );

        tracing::info!(
            chat_provider = ?config.ai.chat_provider,
            embedder = embedder.model(),
            store = ?config.knowledge.backend,
            collection = %config.knowledge.collection,
            checkpoints = ?config.conversation.checkpoint_backend,
            "services ready"
        );

        Ok(Self {
            chat_model,
            embedder,
            store,
            checkpoints,
            orchestrator,
            config: config.clone(),
        })
    }

    pub fn chat_state(&self) -> ChatAppState {
        ChatAppState::new(
            self.orchestrator.clone(),
            self.config.conversation.stream_chunk_chars,
        )
    }

    pub fn knowledge_state(&self) -> KnowledgeAppState {
        KnowledgeAppState::new(
            Arc::new(InspectPassagesHandler::new(Arc::clone(&self.store))),
            Arc::new(SearchPassagesHandler::new(
                Arc::clone(&self.embedder),
                Arc::clone(&self.store),
            )),
        )
    }

    pub fn router(&self) -> Router {
        app_router(self.chat_state(), self.knowledge_state(), &self.config.server)
    }

    pub fn ingest_portfolio_handler(&self) -> IngestPortfolioHandler {
        IngestPortfolioHandler::new(
            Arc::clone(&self.chat_model),
            Arc::clone(&self.embedder),
            Arc::clone(&self.store),
            TextSplitter::default(),
        )
    }

    pub fn build_taxonomy_handler(&self) -> BuildTaxonomyHandler {
        BuildTaxonomyHandler::new(
            Arc::clone(&self.chat_model),
            Arc::clone(&self.embedder),
            Arc::clone(&self.store),
        )
        .with_organization(self.config.conversation.organization_name.clone())
    }
}

fn api_key(config: &AppConfig) -> Result<&Secret<String>, BootstrapError> {
    config
        .ai
        .openai_api_key
        .as_ref()
        .ok_or(BootstrapError::MissingApiKey)
}

fn build_chat_model(config: &AppConfig, model: &str) -> Result<Arc<dyn LanguageModel>, BootstrapError> {
    match config.ai.chat_provider {
        ChatProvider::OpenAI => {
            let provider = OpenAIProvider::new(
                OpenAIConfig::new(api_key(config)?.expose_secret().as_str())
                    .with_model(model)
                    .with_base_url(config.ai.base_url.as_str())
                    .with_timeout(config.ai.timeout())
                    .with_max_retries(config.ai.max_retries),
            )?;
            Ok(Arc::new(provider))
        }
        ChatProvider::Mock => Ok(Arc::new(offline_model(&config.conversation.contact_channel))),
    }
}

/// A model that answers every prompt with an offline notice.
pub fn offline_model(contact_channel: &str) -> MockLanguageModel {
    let notice = format!(
        "Thanks for your message! I'm running in offline mode and can't write a detailed \
         answer right now. Please reach out via {contact_channel} and the team will follow up."
    );
    MockLanguageModel::new().with_handler(move |_| Some(MockResponse::text(notice.clone())))
}

fn build_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>, BootstrapError> {
    match config.ai.embedding_provider {
        EmbeddingProvider::OpenAI => {
            let embedder = OpenAIEmbedder::new(
                OpenAIEmbedderConfig::new(api_key(config)?.expose_secret().as_str())
                    .with_model(config.ai.embedding_model.as_str())
                    .with_base_url(config.ai.base_url.as_str())
                    .with_timeout(config.ai.timeout()),
            )?;
            Ok(Arc::new(embedder))
        }
        EmbeddingProvider::Hashing => {
            Ok(Arc::new(HashingEmbedder::new(config.ai.hashing_dimensions)))
        }
    }
}

async fn build_knowledge_store(config: &AppConfig) -> Result<Arc<dyn KnowledgeStore>, BootstrapError> {
    let knowledge = &config.knowledge;
    match knowledge.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryKnowledgeStore::new(
            knowledge.collection.as_str(),
        ))),
        StoreBackend::File => {
            let store =
                FileKnowledgeStore::open(&knowledge.data_dir, knowledge.collection.as_str())
                    .await?;
            Ok(Arc::new(store))
        }
    }
}

fn build_checkpoint_store(config: &AppConfig) -> Arc<dyn CheckpointStore> {
    match config.conversation.checkpoint_backend {
        CheckpointBackend::Memory => Arc::new(InMemoryCheckpointStore::new()),
        CheckpointBackend::File => {
            Arc::new(FileCheckpointStore::new(&config.conversation.checkpoint_dir))
        }
    }
}
