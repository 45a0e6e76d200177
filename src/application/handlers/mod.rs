//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod conversation;
pub mod ingestion;
pub mod knowledge;

pub use conversation::{
    ConversationLocks, ConversationOrchestrator, OrchestratorSettings, RunTurnCommand, TurnEvent,
    TurnFailure, TurnOutcome,
};
pub use ingestion::{
    BuildTaxonomyCommand, BuildTaxonomyHandler, IngestPortfolioCommand, IngestPortfolioHandler,
    IngestionError, IngestionReport, ProbeResult,
};
pub use knowledge::{
    CollectionOverview, IndexedPassage, InspectPassagesHandler, InspectPassagesQuery,
    InspectPassagesResult, SearchPassagesError, SearchPassagesHandler, SearchPassagesQuery,
};
