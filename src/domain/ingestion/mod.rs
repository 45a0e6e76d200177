//! Ingestion module - Turning portfolio records into indexable passages.
//!
//! Two strategies share this module:
//!
//! - **Sections**: each page section becomes context-injected chunks
//!   filed under the best-matching taxonomy category
//! - **Taxonomy**: one LLM-extracted evidence paragraph per master
//!   taxonomy category, validated into store-safe chunks

mod portfolio;
mod splitter;
mod taxonomy;
mod tech_catalog;

pub use portfolio::{
    collapse_whitespace, is_noise_heading, parse_records, slugify, PortfolioRecord,
    PortfolioSection, SectionDocument, MIN_SECTION_CHARS, NOISE_HEADINGS,
};
pub use splitter::{TextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_SEPARATORS};
pub use taxonomy::{
    categorize, extraction_prompt, extraction_schema, find_category, validate_evidence,
    CategoryMatch, ExtractedEvidence, ExtractedMetadata, TaxonomyCategory, TaxonomyChunk,
    DEFAULT_SECTION_CATEGORY, MASTER_TAXONOMY,
};
pub use tech_catalog::{detect_tech_stack, flatten_tech_stack, TechStack};
