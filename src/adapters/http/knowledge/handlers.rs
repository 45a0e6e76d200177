//! HTTP handlers for the knowledge inspection endpoints.
//!
//! An operator surface: store errors are reported with their details.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::knowledge::{
    InspectPassagesHandler, InspectPassagesQuery, SearchPassagesError, SearchPassagesHandler,
    SearchPassagesQuery, DEFAULT_SEARCH_K,
};

use super::dto::{
    BadRequestResponse, KnowledgeErrorResponse, SearchParamsDto, SearchResponse,
    SearchResultView, VectorListParams, VectorListResponse, VectorOverviewResponse,
};

pub const MISSING_QUERY_MESSAGE: &str = "Query parameter 'q' required";

/// Shared application state for knowledge handlers.
#[derive(Clone)]
pub struct KnowledgeAppState {
    pub inspect: Arc<InspectPassagesHandler>,
    pub search: Arc<SearchPassagesHandler>,
}

impl KnowledgeAppState {
    pub fn new(inspect: Arc<InspectPassagesHandler>, search: Arc<SearchPassagesHandler>) -> Self {
        Self { inspect, search }
    }
}

/// GET /api/vectors - Filtered, paged listing of every passage.
pub async fn list_vectors(
    State(state): State<KnowledgeAppState>,
    Query(params): Query<VectorListParams>,
) -> Result<impl IntoResponse, KnowledgeApiError> {
    let query = InspectPassagesQuery {
        category: params.category,
        search: params.search,
        offset: params.offset.unwrap_or(0),
        limit: params.limit,
    };

    let result = state
        .inspect
        .handle(query)
        .await
        .map_err(|e| KnowledgeApiError::Internal {
            message: "Failed to retrieve vector data",
            detail: e.to_string(),
        })?;

    Ok((StatusCode::OK, Json(VectorListResponse::from(result))))
}

/// GET /api/vectors/json - Totals, categories and a small sample.
pub async fn vectors_overview(
    State(state): State<KnowledgeAppState>,
) -> Result<impl IntoResponse, KnowledgeApiError> {
    let overview = state
        .inspect
        .overview()
        .await
        .map_err(|e| KnowledgeApiError::Internal {
            message: "Failed to retrieve vector overview",
            detail: e.to_string(),
        })?;

    Ok((StatusCode::OK, Json(VectorOverviewResponse::from(overview))))
}

/// GET /api/search - Top-k semantic search.
///
/// # Errors
/// - 400 Bad Request: `q` missing or blank
pub async fn search_vectors(
    State(state): State<KnowledgeAppState>,
    Query(params): Query<SearchParamsDto>,
) -> Result<impl IntoResponse, KnowledgeApiError> {
    let query = params
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or(KnowledgeApiError::MissingQuery)?;

    let hits = state
        .search
        .handle(SearchPassagesQuery {
            query: query.clone(),
            k: params.k.unwrap_or(DEFAULT_SEARCH_K),
        })
        .await
        .map_err(|e| match e {
            SearchPassagesError::EmptyQuery => KnowledgeApiError::MissingQuery,
            other => KnowledgeApiError::Internal {
                message: "Semantic search failed",
                detail: other.to_string(),
            },
        })?;

    Ok((
        StatusCode::OK,
        Json(SearchResponse {
            success: true,
            query,
            results: hits.into_iter().map(SearchResultView::from).collect(),
        }),
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum KnowledgeApiError {
    MissingQuery,
    Internal {
        message: &'static str,
        detail: String,
    },
}

impl IntoResponse for KnowledgeApiError {
    fn into_response(self) -> Response {
        match self {
            KnowledgeApiError::MissingQuery => (
                StatusCode::BAD_REQUEST,
                Json(BadRequestResponse {
                    error: MISSING_QUERY_MESSAGE.to_string(),
                }),
            )
                .into_response(),
            KnowledgeApiError::Internal { message, detail } => {
                tracing::error!(error = %detail, "{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(KnowledgeErrorResponse {
                        success: false,
                        error: detail,
                        message: message.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
