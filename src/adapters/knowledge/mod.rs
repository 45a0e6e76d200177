//! Knowledge Store Adapters - Implementations of the `KnowledgeStore` port.
//!
//! - `InMemoryKnowledgeStore` - Process-local, for tests and development
//! - `FileKnowledgeStore` - JSON-on-disk, one file per collection

mod file_store;
mod in_memory_store;

pub use file_store::FileKnowledgeStore;
pub use in_memory_store::InMemoryKnowledgeStore;
