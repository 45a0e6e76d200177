//! File-based Checkpoint Store Adapter
//!
//! Stores each conversation's history as a YAML file on disk, named after
//! the conversation id. Conversation ids are restricted to filename-safe
//! characters, so they are used as-is.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::conversation::ConversationHistory;
use crate::domain::foundation::ConversationId;
use crate::ports::{CheckpointError, CheckpointStore};

/// File-based storage for conversation checkpoints
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    base_path: PathBuf,
}

impl FileCheckpointStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileCheckpointStore::new("./data/checkpoints");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn checkpoint_path(&self, conversation_id: &ConversationId) -> PathBuf {
        self.base_path
            .join(format!("{}.yaml", conversation_id.as_str()))
    }

    async fn ensure_dir(&self) -> Result<(), CheckpointError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn save(
        &self,
        conversation_id: &ConversationId,
        history: &ConversationHistory,
    ) -> Result<(), CheckpointError> {
        self.ensure_dir().await?;

        let yaml = serde_yaml::to_string(history)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))?;

        // Readers see either the old history or the new one, never a torn write.
        let path = self.checkpoint_path(conversation_id);
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml)
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))?;

        Ok(())
    }

    async fn load(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<ConversationHistory, CheckpointError> {
        let file_path = self.checkpoint_path(conversation_id);

        if !file_path.exists() {
            return Err(CheckpointError::NotFound(conversation_id.clone()));
        }

        let yaml = fs::read_to_string(&file_path)
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))?;

        serde_yaml::from_str(&yaml)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    async fn exists(&self, conversation_id: &ConversationId) -> Result<bool, CheckpointError> {
        Ok(self.checkpoint_path(conversation_id).exists())
    }

    async fn delete(&self, conversation_id: &ConversationId) -> Result<(), CheckpointError> {
        let file_path = self.checkpoint_path(conversation_id);
        if file_path.exists() {
            fs::remove_file(&file_path)
                .await
                .map_err(|e| CheckpointError::IoError(e.to_string()))?;
        }
        Ok(())
    }
}
