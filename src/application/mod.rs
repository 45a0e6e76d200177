//! Application layer - Services, Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands (running a turn, ingesting a portfolio) are kept apart from the
//! read-only knowledge queries.

pub mod handlers;
pub mod services;

pub use handlers::{
    // Conversation
    ConversationOrchestrator, OrchestratorSettings, RunTurnCommand, TurnEvent, TurnFailure,
    TurnOutcome,
    // Ingestion
    BuildTaxonomyCommand, BuildTaxonomyHandler, IngestPortfolioCommand, IngestPortfolioHandler,
    IngestionError, IngestionReport,
    // Knowledge
    InspectPassagesHandler, SearchPassagesHandler,
};
pub use services::{
    GeneratorSettings, LlmIntentClassifier, LlmResponseGenerator, MultiQueryRetriever,
    RetrieverSettings,
};
