//! Conversation runtime configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::orchestrator::prompts::{DEFAULT_CONTACT_CHANNEL, DEFAULT_ORGANIZATION};

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Intent classifier implementation
    #[serde(default)]
    pub classifier: ClassifierKind,

    /// Where conversation histories are checkpointed
    #[serde(default)]
    pub checkpoint_backend: CheckpointBackend,

    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,

    /// Per-stage timeout in seconds (classification, retrieval, generation)
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_secs: u64,

    /// Characters per streamed token frame
    #[serde(default = "default_stream_chunk_chars")]
    pub stream_chunk_chars: usize,

    /// Name the assistant speaks for
    #[serde(default = "default_organization")]
    pub organization_name: String,

    /// Where visitors are pointed for follow-up
    #[serde(default = "default_contact_channel")]
    pub contact_channel: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Llm,
    Keyword,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    #[default]
    Memory,
    File,
}

impl ConversationConfig {
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stage_timeout_secs == 0 || self.stage_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("conversation.stage_timeout_secs"));
        }
        if self.stream_chunk_chars == 0 {
            return Err(ValidationError::MustBePositive("conversation.stream_chunk_chars"));
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::default(),
            checkpoint_backend: CheckpointBackend::default(),
            checkpoint_dir: default_checkpoint_dir(),
            stage_timeout_secs: default_stage_timeout(),
            stream_chunk_chars: default_stream_chunk_chars(),
            organization_name: default_organization(),
            contact_channel: default_contact_channel(),
        }
    }
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("./data/checkpoints")
}

fn default_stage_timeout() -> u64 {
    30
}

fn default_stream_chunk_chars() -> usize {
    10
}

fn default_organization() -> String {
    DEFAULT_ORGANIZATION.to_string()
}

fn default_contact_channel() -> String {
    DEFAULT_CONTACT_CHANNEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_defaults() {
        let config = ConversationConfig::default();
        assert_eq!(config.classifier, ClassifierKind::Llm);
        assert_eq!(config.checkpoint_backend, CheckpointBackend::Memory);
        assert_eq!(config.stage_timeout(), Duration::from_secs(30));
        assert_eq!(config.stream_chunk_chars, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = ConversationConfig {
            stream_chunk_chars: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stage_timeout_bounds() {
        let config = ConversationConfig {
            stage_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTimeout("conversation.stage_timeout_secs"))
        );
    }
}
