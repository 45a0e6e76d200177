//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Language models (OpenAI, mock)
//! - `embedding` - Embedders (OpenAI, feature hashing)
//! - `knowledge` - Passage stores (in-memory, JSON file)
//! - `storage` - Conversation checkpoints (in-memory, YAML file)
//! - `http` - REST and SSE endpoints

pub mod ai;
pub mod embedding;
pub mod http;
pub mod knowledge;
pub mod storage;
