//! HTTP DTOs for the chat endpoint.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::handlers::conversation::TurnOutcome;
use crate::domain::routing::{Intent, Route, Urgency};

/// Maximum accepted message length in characters.
pub const MAX_MESSAGE_CHARS: usize = 10_000;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Existing conversation to continue. A new id is generated when absent.
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: String,
    /// Respond with server-sent events instead of a single JSON body.
    #[serde(default)]
    pub stream: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Non-streaming reply.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub reply: String,
    pub intent: Intent,
    pub urgency: Urgency,
    pub route: Route,
    pub passages_used: usize,
}

impl From<TurnOutcome> for ChatResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            conversation_id: outcome.conversation_id.to_string(),
            reply: outcome.reply,
            intent: outcome.classification.intent,
            urgency: outcome.classification.urgency,
            route: outcome.route,
            passages_used: outcome.passages_used,
        }
    }
}

/// Error body returned by the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Stream Frames
// ════════════════════════════════════════════════════════════════════════════════

/// One SSE `data:` payload, tagged by `type`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    /// A graph node started.
    Node {
        stream_id: String,
        node: String,
        timestamp: f64,
    },
    /// Retrieval finished.
    Tool {
        stream_id: String,
        node: String,
        tool_result: String,
        timestamp: f64,
    },
    /// A slice of the reply.
    Token {
        stream_id: String,
        node: String,
        content: String,
        tokens_so_far: usize,
        timestamp: f64,
    },
    /// The whole reply.
    Message {
        stream_id: String,
        node: String,
        content: String,
        complete: bool,
    },
    Usage {
        stream_id: String,
        input_tokens: u32,
        output_tokens: u32,
        total_tokens: u32,
        complete: bool,
    },
    Complete {
        stream_id: String,
        message: String,
        timestamp: f64,
    },
    Error {
        stream_id: String,
        message: String,
        timestamp: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_defaults_to_non_streaming() {
        let request: ChatRequest = serde_json::from_value(json!({"message": "Hi"})).unwrap();
        assert_eq!(request.message, "Hi");
        assert!(request.conversation_id.is_none());
        assert!(!request.stream);
    }

    #[test]
    fn chat_request_accepts_all_fields() {
        let request: ChatRequest = serde_json::from_value(json!({
            "conversation_id": "abc-123",
            "message": "Do you know React?",
            "stream": true
        }))
        .unwrap();
        assert_eq!(request.conversation_id.as_deref(), Some("abc-123"));
        assert!(request.stream);
    }

    #[test]
    fn stream_frames_are_tagged_by_type() {
        let frame = StreamFrame::Tool {
            stream_id: "s1".to_string(),
            node: "rag_executor".to_string(),
            tool_result: "Retrieved 3 items".to_string(),
            timestamp: 1_700_000_000.0,
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "tool");
        assert_eq!(value["tool_result"], "Retrieved 3 items");
    }

    #[test]
    fn usage_frame_serializes_counts() {
        let frame = StreamFrame::Usage {
            stream_id: "s1".to_string(),
            input_tokens: 10,
            output_tokens: 5,
            total_tokens: 15,
            complete: true,
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "usage");
        assert_eq!(value["total_tokens"], 15);
        assert_eq!(value["complete"], true);
    }
}
