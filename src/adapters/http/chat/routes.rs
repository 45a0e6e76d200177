//! Axum routes for the chat endpoint.

use axum::routing::post;
use axum::Router;

use super::handlers::{chat, ChatAppState};

/// Creates routes for chat endpoints.
///
/// - POST /chat - Run a turn (JSON or SSE)
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new().route("/chat", post(chat))
}

/// Chat routes under /api, with state applied.
pub fn chat_router(state: ChatAppState) -> Router {
    Router::new().nest("/api", chat_routes()).with_state(state)
}
