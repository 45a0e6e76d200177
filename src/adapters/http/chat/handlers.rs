//! HTTP handlers for the chat endpoint.
//!
//! These handlers connect Axum routes to the conversation orchestrator.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::conversation::{ConversationOrchestrator, RunTurnCommand};
use crate::domain::foundation::ConversationId;

use super::dto::{ChatRequest, ChatResponse, ErrorResponse, MAX_MESSAGE_CHARS};
use super::streaming::turn_stream;

/// Polite body for turns that could not complete.
pub const FATAL_TURN_MESSAGE: &str =
    "Sorry, I couldn't process your message right now. Please try again in a moment.";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for chat handlers.
#[derive(Clone)]
pub struct ChatAppState {
    pub orchestrator: ConversationOrchestrator,
    /// Characters per streamed token frame.
    pub stream_chunk_chars: usize,
}

impl ChatAppState {
    pub fn new(orchestrator: ConversationOrchestrator, stream_chunk_chars: usize) -> Self {
        Self {
            orchestrator,
            stream_chunk_chars,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /api/chat
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/chat - Run one conversational turn.
///
/// With `stream: true` the reply is delivered as server-sent events.
///
/// # Errors
/// - 400 Bad Request: empty or oversized message, malformed conversation id
/// - 500 Internal Server Error: the turn could not be persisted
pub async fn chat(
    State(state): State<ChatAppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ChatApiError> {
    let command = validate_request(&request)?;

    tracing::debug!(
        conversation_id = %command.conversation_id,
        stream = request.stream,
        "chat request"
    );

    if request.stream {
        let stream = turn_stream(state.orchestrator, command, state.stream_chunk_chars);
        return Ok(Sse::new(stream)
            .keep_alive(KeepAlive::default())
            .into_response());
    }

    let outcome = state
        .orchestrator
        .handle(command, None)
        .await
        .map_err(|e| ChatApiError::Internal(e.to_string()))?;

    Ok((StatusCode::OK, Json(ChatResponse::from(outcome))).into_response())
}

fn validate_request(request: &ChatRequest) -> Result<RunTurnCommand, ChatApiError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ChatApiError::BadRequest("Message must not be empty".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ChatApiError::BadRequest(format!(
            "Message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let conversation_id = match &request.conversation_id {
        Some(id) => ConversationId::new(id.as_str())
            .map_err(|e| ChatApiError::BadRequest(e.to_string()))?,
        None => ConversationId::generate(),
    };

    Ok(RunTurnCommand::new(conversation_id, message))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts turn failures to HTTP responses.
#[derive(Debug)]
pub enum ChatApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ChatApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            ChatApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(FATAL_TURN_MESSAGE),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: &str, conversation_id: Option<&str>) -> ChatRequest {
        ChatRequest {
            conversation_id: conversation_id.map(str::to_string),
            message: message.to_string(),
            stream: false,
        }
    }

    #[test]
    fn blank_message_is_rejected() {
        let result = validate_request(&request("   ", None));
        assert!(matches!(result, Err(ChatApiError::BadRequest(_))));
    }

    #[test]
    fn oversized_message_is_rejected() {
        let long = "a".repeat(MAX_MESSAGE_CHARS + 1);
        let result = validate_request(&request(&long, None));
        assert!(matches!(result, Err(ChatApiError::BadRequest(_))));
    }

    #[test]
    fn message_at_limit_is_accepted() {
        let exact = "a".repeat(MAX_MESSAGE_CHARS);
        assert!(validate_request(&request(&exact, None)).is_ok());
    }

    #[test]
    fn missing_conversation_id_is_generated() {
        let command = validate_request(&request("Hi", None)).unwrap();
        assert!(!command.conversation_id.as_str().is_empty());
        assert_eq!(command.message, "Hi");
    }

    #[test]
    fn provided_conversation_id_is_kept() {
        let command = validate_request(&request("Hi", Some("visitor-42"))).unwrap();
        assert_eq!(command.conversation_id.as_str(), "visitor-42");
    }

    #[test]
    fn malformed_conversation_id_is_rejected() {
        let result = validate_request(&request("Hi", Some("bad id!")));
        assert!(matches!(result, Err(ChatApiError::BadRequest(_))));
    }

    #[test]
    fn bad_request_returns_400() {
        let response = ChatApiError::BadRequest("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_error_returns_500() {
        let response = ChatApiError::Internal("disk full".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
