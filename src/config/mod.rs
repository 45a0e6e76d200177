//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `PORTFOLIO_CONCIERGE`
//! prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use portfolio_concierge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod conversation;
mod error;
mod knowledge;
mod retrieval;
mod server;

pub use ai::{AiConfig, ChatProvider, EmbeddingProvider};
pub use conversation::{CheckpointBackend, ClassifierKind, ConversationConfig};
pub use error::{ConfigError, ValidationError};
pub use knowledge::{KnowledgeConfig, StoreBackend};
pub use retrieval::RetrievalConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults; only the OpenAI key is needed when an
/// OpenAI-backed component is selected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Model and embedding providers
    #[serde(default)]
    pub ai: AiConfig,

    /// Passage store backend and collection
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Multi-query MMR parameters
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Classifier, checkpointing and streaming
    #[serde(default)]
    pub conversation: ConversationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PORTFOLIO_CONCIERGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Falls back to the bare `OPENAI_API_KEY` variable for the API key
    ///
    /// # Environment Variable Format
    ///
    /// - `PORTFOLIO_CONCIERGE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PORTFOLIO_CONCIERGE__RETRIEVAL__K=4` -> `retrieval.k = 4`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config: AppConfig = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PORTFOLIO_CONCIERGE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        if config.ai.openai_api_key.is_none() {
            config.ai.openai_api_key = std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(secrecy::Secret::new);
        }

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.knowledge.validate()?;
        self.retrieval.validate()?;
        self.conversation.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_offline_env() {
        env::set_var("PORTFOLIO_CONCIERGE__AI__CHAT_PROVIDER", "mock");
        env::set_var("PORTFOLIO_CONCIERGE__AI__EMBEDDING_PROVIDER", "hashing");
        env::set_var("PORTFOLIO_CONCIERGE__CONVERSATION__CLASSIFIER", "keyword");
    }

    fn clear_env() {
        env::remove_var("PORTFOLIO_CONCIERGE__AI__CHAT_PROVIDER");
        env::remove_var("PORTFOLIO_CONCIERGE__AI__EMBEDDING_PROVIDER");
        env::remove_var("PORTFOLIO_CONCIERGE__CONVERSATION__CLASSIFIER");
        env::remove_var("PORTFOLIO_CONCIERGE__AI__OPENAI_API_KEY");
        env::remove_var("PORTFOLIO_CONCIERGE__SERVER__PORT");
        env::remove_var("PORTFOLIO_CONCIERGE__SERVER__ENVIRONMENT");
        env::remove_var("PORTFOLIO_CONCIERGE__RETRIEVAL__K");
        env::remove_var("PORTFOLIO_CONCIERGE__RETRIEVAL__FETCH_K");
        env::remove_var("PORTFOLIO_CONCIERGE__KNOWLEDGE__BACKEND");
    }

    #[test]
    fn test_load_offline_configuration() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_offline_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.chat_provider, ChatProvider::Mock);
        assert_eq!(config.ai.embedding_provider, EmbeddingProvider::Hashing);
        assert_eq!(config.conversation.classifier, ClassifierKind::Keyword);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_offline_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.knowledge.collection, "project_portfolio");
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_offline_env();
        env::set_var("PORTFOLIO_CONCIERGE__SERVER__PORT", "3000");
        env::set_var("PORTFOLIO_CONCIERGE__SERVER__ENVIRONMENT", "production");
        env::set_var("PORTFOLIO_CONCIERGE__RETRIEVAL__K", "4");
        env::set_var("PORTFOLIO_CONCIERGE__KNOWLEDGE__BACKEND", "memory");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(config.retrieval.k, 4);
        assert_eq!(config.knowledge.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_invalid_retrieval_window_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_offline_env();
        env::set_var("PORTFOLIO_CONCIERGE__RETRIEVAL__K", "8");
        env::set_var("PORTFOLIO_CONCIERGE__RETRIEVAL__FETCH_K", "4");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.validate(), Err(ValidationError::InvalidRetrievalWindow));
    }

    #[test]
    fn test_llm_classifier_runs_on_mock_model_without_key() {
        let config = AppConfig {
            ai: AiConfig {
                chat_provider: ChatProvider::Mock,
                embedding_provider: EmbeddingProvider::Hashing,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(config.conversation.classifier, ClassifierKind::Llm);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_configuration_requires_openai_key() {
        let config = AppConfig::default();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("OPENAI_API_KEY"))
        );
    }
}
