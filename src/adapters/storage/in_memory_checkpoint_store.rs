//! In-Memory Checkpoint Store Adapter
//!
//! Stores conversation history in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::ConversationHistory;
use crate::domain::foundation::ConversationId;
use crate::ports::{CheckpointError, CheckpointStore};

/// In-memory storage for conversation checkpoints
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    checkpoints: Arc<RwLock<HashMap<ConversationId, ConversationHistory>>>,
}

impl InMemoryCheckpointStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.checkpoints.write().await.clear();
    }

    /// Get the number of stored conversations
    pub async fn conversation_count(&self) -> usize {
        self.checkpoints.read().await.len()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn save(
        &self,
        conversation_id: &ConversationId,
        history: &ConversationHistory,
    ) -> Result<(), CheckpointError> {
        let mut checkpoints = self.checkpoints.write().await;
        checkpoints.insert(conversation_id.clone(), history.clone());
        Ok(())
    }

    async fn load(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<ConversationHistory, CheckpointError> {
        let checkpoints = self.checkpoints.read().await;
        checkpoints
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| CheckpointError::NotFound(conversation_id.clone()))
    }

    async fn exists(&self, conversation_id: &ConversationId) -> Result<bool, CheckpointError> {
        Ok(self.checkpoints.read().await.contains_key(conversation_id))
    }

    async fn delete(&self, conversation_id: &ConversationId) -> Result<(), CheckpointError> {
        self.checkpoints.write().await.remove(conversation_id);
        Ok(())
    }
}
