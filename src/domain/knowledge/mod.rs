//! Knowledge module - Passages, their store-safe metadata, similarity scoring
//! and the grounding block handed to the response generator.

mod grounding;
mod metadata;
mod passage;
mod similarity;

pub use grounding::{Grounding, DEFAULT_GROUNDING_LIMIT};
pub use metadata::{keys, MetadataValue, PassageMetadata};
pub(crate) use metadata::truncate_chars;
pub use passage::{EmbeddedPassage, Passage, DEFAULT_CATEGORY};
pub use similarity::{cosine_similarity, max_marginal_relevance};
