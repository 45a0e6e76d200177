//! Error types for turn orchestration and its domain services.

use thiserror::Error;

/// Invariant violations inside a single turn.
///
/// These indicate a mis-wired graph, never a degraded external call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("classification was already recorded for this turn")]
    ClassificationAlreadySet,

    #[error("retrieval already ran for this turn")]
    RetrievalAlreadyRan,

    #[error("a reply was already generated for this turn")]
    DuplicateReply,

    #[error("node '{node}' requires {missing}")]
    MissingState {
        node: &'static str,
        missing: &'static str,
    },

    #[error("the turn has already finished")]
    Finished,
}

/// Errors from intent classification.
#[derive(Debug, Clone, Error)]
pub enum ClassificationError {
    #[error("language model call failed: {0}")]
    Model(String),

    #[error("classifier returned unusable output: {0}")]
    InvalidOutput(String),
}

/// Errors from the retriever.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("retrieval query is empty")]
    EmptyQuery,

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("knowledge store failed: {0}")]
    Store(String),
}

/// Errors from response generation.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("language model call failed: {0}")]
    Model(String),

    #[error("language model returned an empty reply")]
    EmptyReply,
}
