//! Retrieval tuning

use serde::Deserialize;

use crate::application::services::{
    RetrieverSettings, DEFAULT_EXPANSION_QUERIES, DEFAULT_FETCH_K, DEFAULT_K, DEFAULT_LAMBDA,
};
use crate::domain::knowledge::DEFAULT_GROUNDING_LIMIT;

use super::error::ValidationError;

/// Multi-query MMR retrieval parameters
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Passages returned per query
    #[serde(default = "default_k")]
    pub k: usize,

    /// Candidates fetched per expanded query before MMR
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// MMR trade-off: 1.0 is pure relevance, 0.0 is pure diversity
    #[serde(default = "default_lambda")]
    pub lambda: f64,

    /// Alternative phrasings requested from the model
    #[serde(default = "default_expansion_queries")]
    pub expansion_queries: usize,

    /// Passages included in the reply prompt
    #[serde(default = "default_grounding_limit")]
    pub grounding_limit: usize,
}

impl RetrievalConfig {
    pub fn retriever_settings(&self) -> RetrieverSettings {
        RetrieverSettings {
            k: self.k,
            fetch_k: self.fetch_k,
            lambda: self.lambda,
            expansion_queries: self.expansion_queries,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.k == 0 || self.fetch_k < self.k {
            return Err(ValidationError::InvalidRetrievalWindow);
        }
        if !(0.0..=1.0).contains(&self.lambda) {
            return Err(ValidationError::InvalidLambda);
        }
        if self.grounding_limit == 0 {
            return Err(ValidationError::MustBePositive("retrieval.grounding_limit"));
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            fetch_k: default_fetch_k(),
            lambda: default_lambda(),
            expansion_queries: default_expansion_queries(),
            grounding_limit: default_grounding_limit(),
        }
    }
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_fetch_k() -> usize {
    DEFAULT_FETCH_K
}

fn default_lambda() -> f64 {
    DEFAULT_LAMBDA
}

fn default_expansion_queries() -> usize {
    DEFAULT_EXPANSION_QUERIES
}

fn default_grounding_limit() -> usize {
    DEFAULT_GROUNDING_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.k, 6);
        assert_eq!(config.fetch_k, 20);
        assert_eq!(config.lambda, 0.5);
        assert_eq!(config.grounding_limit, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fetch_k_below_k_rejected() {
        let config = RetrievalConfig {
            k: 10,
            fetch_k: 5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRetrievalWindow));
    }

    #[test]
    fn test_zero_k_rejected() {
        let config = RetrievalConfig {
            k: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRetrievalWindow));
    }

    #[test]
    fn test_lambda_out_of_range_rejected() {
        let config = RetrievalConfig {
            lambda: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidLambda));
    }

    #[test]
    fn test_retriever_settings_carry_values() {
        let config = RetrievalConfig {
            k: 3,
            fetch_k: 9,
            lambda: 0.7,
            expansion_queries: 0,
            grounding_limit: 2,
        };
        let settings = config.retriever_settings();
        assert_eq!(settings.k, 3);
        assert_eq!(settings.fetch_k, 9);
        assert_eq!(settings.expansion_queries, 0);
    }
}
