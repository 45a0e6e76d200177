//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `LanguageModel` - Chat completions, plain and structured
//! - `Embedder` - Text to fixed-length vectors
//! - `KnowledgeStore` - The passage vector index
//! - `CheckpointStore` - Per-conversation history persistence

mod checkpoint_store;
mod embedder;
mod knowledge_store;
mod language_model;

pub use checkpoint_store::{CheckpointError, CheckpointStore};
pub use embedder::{Embedder, EmbeddingError};
pub use knowledge_store::{
    check_dimensions, rank_entries, KnowledgeStore, KnowledgeStoreError, SearchHit, SearchMode,
    SearchParams, StoreStats,
};
pub use language_model::{
    invoke_structured, ChatMessage, CompletionRequest, CompletionResponse, FinishReason,
    LanguageModel, LlmError, MessageRole, ModelInfo, ResponseFormat, TokenUsage,
};
