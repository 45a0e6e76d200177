//! Checkpoint Storage Adapters
//!
//! Implementations of the `CheckpointStore` port:
//! - `InMemoryCheckpointStore` - For testing and development
//! - `FileCheckpointStore` - YAML files on disk

mod file_checkpoint_store;
mod in_memory_checkpoint_store;

pub use file_checkpoint_store::FileCheckpointStore;
pub use in_memory_checkpoint_store::InMemoryCheckpointStore;
