//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Configuration value must not be empty: {0}")]
    EmptyValue(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(&'static str),

    #[error("Retrieval requires fetch_k >= k > 0")]
    InvalidRetrievalWindow,

    #[error("MMR lambda must be between 0 and 1")]
    InvalidLambda,

    #[error("Invalid {0}: must be greater than zero")]
    MustBePositive(&'static str),

    #[error("Temperature must be between 0 and 2")]
    InvalidTemperature,
}
