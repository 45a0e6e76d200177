//! Embedder Port - Interface for text embedding models.
//!
//! Ingestion and query must use the same embedder; vectors from different
//! models or dimensions are not comparable.

use async_trait::async_trait;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a batch of texts, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embeds a single query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no vector returned".to_string()))
    }

    /// Length of every vector this embedder produces.
    fn dimensions(&self) -> usize;

    /// Model identifier, recorded alongside stored vectors.
    fn model(&self) -> &str;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding provider unavailable: {0}")]
    Unavailable(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("expected {expected} vectors, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}
