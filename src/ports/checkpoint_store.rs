//! Checkpoint Store Port - Interface for persisting conversation history.
//!
//! A checkpoint is read once when a turn starts and written once when it
//! ends. Nothing is written for a turn that never produced a reply.

use async_trait::async_trait;

use crate::domain::conversation::ConversationHistory;
use crate::domain::foundation::ConversationId;

/// Errors that can occur during checkpoint operations
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("Checkpoint not found for conversation: {0}")]
    NotFound(ConversationId),

    #[error("Failed to serialize checkpoint: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize checkpoint: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting and loading conversation history
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Save the full history for a conversation, replacing any previous one
    ///
    /// # Errors
    /// Returns `CheckpointError` if save fails
    async fn save(
        &self,
        conversation_id: &ConversationId,
        history: &ConversationHistory,
    ) -> Result<(), CheckpointError>;

    /// Load the history for a conversation
    ///
    /// # Errors
    /// Returns `CheckpointError::NotFound` if no checkpoint exists
    async fn load(&self, conversation_id: &ConversationId)
        -> Result<ConversationHistory, CheckpointError>;

    /// Check if a checkpoint exists
    async fn exists(&self, conversation_id: &ConversationId) -> Result<bool, CheckpointError>;

    /// Delete the checkpoint for a conversation
    ///
    /// Deleting a missing checkpoint is not an error.
    async fn delete(&self, conversation_id: &ConversationId) -> Result<(), CheckpointError>;
}
