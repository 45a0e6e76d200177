//! HTTP adapter for the knowledge inspection endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{KnowledgeApiError, KnowledgeAppState};
pub use routes::{knowledge_router, knowledge_routes};
