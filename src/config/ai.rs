//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key
    pub openai_api_key: Option<Secret<String>>,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Backend for chat completions
    #[serde(default)]
    pub chat_provider: ChatProvider,

    /// Model used for replies and query expansion
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for intent classification (defaults to `chat_model`)
    pub classifier_model: Option<String>,

    /// Reply sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on reply length
    #[serde(default = "default_max_reply_tokens")]
    pub max_reply_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on retryable failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Backend for embeddings
    #[serde(default)]
    pub embedding_provider: EmbeddingProvider,

    /// OpenAI embedding model
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Vector size of the hashing embedder
    #[serde(default = "default_hashing_dimensions")]
    pub hashing_dimensions: usize,
}

/// Chat completion backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatProvider {
    #[default]
    OpenAI,
    /// Canned replies, for offline development
    Mock,
}

/// Embedding backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    OpenAI,
    /// Deterministic feature hashing, no network
    Hashing,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    pub fn classifier_model(&self) -> &str {
        self.classifier_model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.chat_model)
    }

    /// Whether any selected component calls OpenAI.
    pub fn uses_openai(&self) -> bool {
        self.chat_provider == ChatProvider::OpenAI
            || self.embedding_provider == EmbeddingProvider::OpenAI
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.uses_openai() && !self.has_openai() {
            return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
        }
        if self.chat_model.trim().is_empty() {
            return Err(ValidationError::EmptyValue("ai.chat_model"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.max_reply_tokens == 0 {
            return Err(ValidationError::MustBePositive("ai.max_reply_tokens"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout("ai.timeout_secs"));
        }
        if self.embedding_provider == EmbeddingProvider::Hashing && self.hashing_dimensions == 0 {
            return Err(ValidationError::MustBePositive("ai.hashing_dimensions"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: default_base_url(),
            chat_provider: ChatProvider::default(),
            chat_model: default_chat_model(),
            classifier_model: None,
            temperature: default_temperature(),
            max_reply_tokens: default_max_reply_tokens(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            embedding_provider: EmbeddingProvider::default(),
            embedding_model: default_embedding_model(),
            hashing_dimensions: default_hashing_dimensions(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_reply_tokens() -> u32 {
    300
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

fn default_embedding_model() -> String {
    "text-embedding-3-large".to_string()
}

fn default_hashing_dimensions() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.chat_provider, ChatProvider::OpenAI);
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.embedding_model, "text-embedding-3-large");
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 45,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(45));
    }

    #[test]
    fn test_openai_key_required_when_used() {
        let config = AiConfig::default();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("OPENAI_API_KEY"))
        );
    }

    #[test]
    fn test_offline_components_need_no_key() {
        let config = AiConfig {
            chat_provider: ChatProvider::Mock,
            embedding_provider: EmbeddingProvider::Hashing,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_classifier_model_falls_back_to_chat_model() {
        let mut config = AiConfig::default();
        assert_eq!(config.classifier_model(), "gpt-4o-mini");

        config.classifier_model = Some("gpt-4o".to_string());
        assert_eq!(config.classifier_model(), "gpt-4o");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AiConfig {
            openai_api_key: Some(Secret::new("sk-secret".to_string())),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_temperature_range() {
        let config = AiConfig {
            openai_api_key: Some(Secret::new("sk-x".to_string())),
            temperature: 3.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTemperature));
    }
}
