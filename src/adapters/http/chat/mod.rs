//! HTTP adapter for the chat endpoint.

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod streaming;

pub use dto::{ChatRequest, ChatResponse, StreamFrame};
pub use handlers::{ChatApiError, ChatAppState};
pub use routes::{chat_router, chat_routes};
pub use streaming::{chunk_reply, turn_stream, FrameTranslator};
