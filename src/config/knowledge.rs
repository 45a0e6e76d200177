//! Knowledge store configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where passages and their embeddings are kept
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory holding one JSON file per collection (file backend)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Collection name
    #[serde(default = "default_collection")]
    pub collection: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

impl KnowledgeConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.collection.trim().is_empty() {
            return Err(ValidationError::EmptyValue("knowledge.collection"));
        }
        Ok(())
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_dir: default_data_dir(),
            collection: default_collection(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/knowledge")
}

fn default_collection() -> String {
    "project_portfolio".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_config_defaults() {
        let config = KnowledgeConfig::default();
        assert_eq!(config.backend, StoreBackend::File);
        assert_eq!(config.collection, "project_portfolio");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_collection_rejected() {
        let config = KnowledgeConfig {
            collection: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::EmptyValue("knowledge.collection"))
        );
    }
}
