//! HTTP adapters - REST and SSE endpoints.
//!
//! Each surface has its own module with DTOs, handlers and routes:
//! - `chat` - the conversational endpoint
//! - `knowledge` - passage inspection and semantic search

pub mod chat;
pub mod knowledge;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use chat::{chat_router, ChatAppState};
pub use knowledge::{knowledge_router, KnowledgeAppState};

use crate::config::ServerConfig;

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The full application router.
///
/// The request timeout applies to every route except chat, whose turns
/// are bounded by per-stage timeouts and may stream for longer.
pub fn app_router(chat: ChatAppState, knowledge: KnowledgeAppState, server: &ServerConfig) -> Router {
    let bounded = Router::new()
        .route("/health", get(health))
        .merge(knowledge_router(knowledge))
        .layer(TimeoutLayer::new(server.request_timeout()));

    Router::new()
        .merge(chat_router(chat))
        .merge(bounded)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&server.allowed_origins()))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}
