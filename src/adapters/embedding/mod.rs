//! Embedding Adapters.
//!
//! - `OpenAIEmbedder` - OpenAI embeddings API
//! - `HashingEmbedder` - Deterministic offline embedder

mod hashing_embedder;
mod openai_embedder;

pub use hashing_embedder::{HashingEmbedder, DEFAULT_HASHING_DIMENSIONS};
pub use openai_embedder::{
    model_dimensions, OpenAIEmbedder, OpenAIEmbedderConfig, DEFAULT_EMBEDDING_MODEL,
};
