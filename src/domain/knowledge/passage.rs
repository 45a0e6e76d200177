//! Passages: immutable units of indexed text.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::PassageId;

use super::metadata::PassageMetadata;

/// Category shown for passages that carry none.
pub const DEFAULT_CATEGORY: &str = "General";

/// An immutable unit of indexed text with flat metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: PassageId,
    pub content: String,
    pub metadata: PassageMetadata,
}

impl Passage {
    pub fn new(id: PassageId, content: impl Into<String>, metadata: PassageMetadata) -> Self {
        Self {
            id,
            content: content.into(),
            metadata,
        }
    }

    /// Creates a passage whose id is derived from its source and content.
    pub fn derived(source: &str, content: impl Into<String>, metadata: PassageMetadata) -> Self {
        let content = content.into();
        let id = PassageId::derive(&[source, &content]);
        Self::new(id, content, metadata)
    }

    /// Category label, or [`DEFAULT_CATEGORY`] when absent.
    pub fn category(&self) -> &str {
        self.metadata.category().unwrap_or(DEFAULT_CATEGORY)
    }
}

/// A passage paired with the embedding it is indexed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedPassage {
    pub passage: Passage,
    pub embedding: Vec<f32>,
}

impl EmbeddedPassage {
    pub fn new(passage: Passage, embedding: Vec<f32>) -> Self {
        Self { passage, embedding }
    }
}
