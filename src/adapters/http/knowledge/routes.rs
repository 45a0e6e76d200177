//! Axum routes for the knowledge inspection endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{list_vectors, search_vectors, vectors_overview, KnowledgeAppState};

/// Creates routes for knowledge endpoints.
///
/// - GET /vectors - Filtered listing
/// - GET /vectors/json - Overview
/// - GET /search - Semantic search
pub fn knowledge_routes() -> Router<KnowledgeAppState> {
    Router::new()
        .route("/vectors", get(list_vectors))
        .route("/vectors/json", get(vectors_overview))
        .route("/search", get(search_vectors))
}

/// Knowledge routes under /api, with state applied.
pub fn knowledge_router(state: KnowledgeAppState) -> Router {
    Router::new().nest("/api", knowledge_routes()).with_state(state)
}
