//! HTTP DTOs for the knowledge inspection endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::handlers::knowledge::{
    CollectionOverview, IndexedPassage, InspectPassagesResult,
};
use crate::domain::knowledge::{keys, Passage};
use crate::ports::{SearchHit, StoreStats};

/// Characters of content shown before truncation.
pub const CONTENT_PREVIEW_CHARS: usize = 500;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query parameters of `GET /api/vectors`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VectorListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query parameters of `GET /api/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParamsDto {
    pub q: Option<String>,
    pub k: Option<usize>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct VectorListResponse {
    pub success: bool,
    pub total_vectors: usize,
    pub filtered_count: usize,
    pub categories: Vec<String>,
    pub data: Vec<VectorView>,
    pub vectorstore_stats: StoreStats,
}

impl From<InspectPassagesResult> for VectorListResponse {
    fn from(result: InspectPassagesResult) -> Self {
        Self {
            success: true,
            total_vectors: result.total_vectors,
            filtered_count: result.filtered_count,
            categories: result.categories,
            data: result.passages.iter().map(VectorView::from).collect(),
            vectorstore_stats: result.stats,
        }
    }
}

/// One passage as shown in the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct VectorView {
    pub id: String,
    pub index: usize,
    /// Content truncated for display.
    pub content: String,
    pub full_content: String,
    pub metadata: VectorMetadataView,
}

impl From<&IndexedPassage> for VectorView {
    fn from(indexed: &IndexedPassage) -> Self {
        let passage = &indexed.passage;
        Self {
            id: passage.id.to_string(),
            index: indexed.index,
            content: preview(&passage.content),
            full_content: passage.content.clone(),
            metadata: VectorMetadataView::new(passage, indexed.index),
        }
    }
}

/// The fixed metadata projection of the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct VectorMetadataView {
    pub category: String,
    pub sub_type: String,
    pub keywords: String,
    pub project_ref: String,
    pub evidence_type: String,
    pub taxonomy_score: f64,
    pub chunk_id: Value,
    pub source: String,
    pub created_at: String,
}

impl VectorMetadataView {
    fn new(passage: &Passage, index: usize) -> Self {
        let metadata = &passage.metadata;
        Self {
            category: passage.category().to_string(),
            sub_type: metadata.rendered(keys::SUB_TYPE),
            keywords: metadata.rendered(keys::KEYWORDS),
            project_ref: metadata.rendered(keys::PROJECT_REF),
            evidence_type: metadata.rendered(keys::EVIDENCE_TYPE),
            taxonomy_score: metadata
                .get(keys::TAXONOMY_SCORE)
                .and_then(|v| v.as_f64())
                .unwrap_or(1.0),
            chunk_id: metadata
                .get(keys::CHUNK_ID)
                .map(|v| v.to_json())
                .unwrap_or_else(|| Value::from(index)),
            source: metadata.rendered(keys::SOURCE),
            created_at: metadata.rendered(keys::CREATED_AT),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorOverviewResponse {
    pub total: usize,
    pub categories: Vec<String>,
    pub sample: Vec<String>,
}

impl From<CollectionOverview> for VectorOverviewResponse {
    fn from(overview: CollectionOverview) -> Self {
        Self {
            total: overview.total,
            categories: overview.categories,
            sample: overview.sample,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub results: Vec<SearchResultView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResultView {
    pub content: String,
    pub metadata: Value,
    pub relevance_score: f64,
}

impl From<SearchHit> for SearchResultView {
    fn from(hit: SearchHit) -> Self {
        Self {
            metadata: hit.passage.metadata.to_json(),
            content: hit.passage.content,
            relevance_score: hit.score,
        }
    }
}

/// Body of 500 responses on the inspection surface.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

/// Body of 400 responses.
#[derive(Debug, Clone, Serialize)]
pub struct BadRequestResponse {
    pub error: String,
}

/// First [`CONTENT_PREVIEW_CHARS`] characters, with `...` when cut.
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(CONTENT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PassageId;
    use crate::domain::knowledge::PassageMetadata;

    #[test]
    fn preview_keeps_short_content() {
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn preview_truncates_long_content() {
        let long = "é".repeat(CONTENT_PREVIEW_CHARS + 20);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), CONTENT_PREVIEW_CHARS + 3);
    }

    #[test]
    fn preview_of_exact_length_is_untouched() {
        let exact = "a".repeat(CONTENT_PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);
    }

    #[test]
    fn metadata_view_fills_defaults() {
        let passage = Passage::new(
            PassageId::new("p1"),
            "Shopify storefront",
            PassageMetadata::new().with(keys::CATEGORY, "Technical_Proficiency"),
        );
        let view = VectorView::from(&IndexedPassage { index: 7, passage });
        assert_eq!(view.metadata.category, "Technical_Proficiency");
        assert_eq!(view.metadata.taxonomy_score, 1.0);
        assert_eq!(view.metadata.chunk_id, Value::from(7));
        assert_eq!(view.metadata.sub_type, "");
    }

    #[test]
    fn list_params_are_optional() {
        let params: VectorListParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(params.category.is_none());
        assert!(params.offset.is_none());
    }
}
