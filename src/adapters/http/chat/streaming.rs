//! Server-sent event streaming for chat turns.
//!
//! The turn runs in a spawned task that forwards [`TurnEvent`]s as
//! [`StreamFrame`]s. Dropping the response stream aborts the task, so a
//! client that disconnects mid-turn leaves no checkpoint behind.

use std::convert::Infallible;

use axum::response::sse::Event;
use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::dto::StreamFrame;
use crate::application::handlers::conversation::{
    ConversationOrchestrator, RunTurnCommand, TurnEvent,
};
use crate::domain::orchestrator::Node;

/// Shown to the client when a streamed turn fails.
pub const STREAM_ERROR_MESSAGE: &str =
    "Sorry, something went wrong while preparing a reply. Please try again in a moment.";

const STREAM_COMPLETE_MESSAGE: &str = "Execution finished successfully";

fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Splits `text` into pieces of at most `chunk_chars` characters.
pub fn chunk_reply(text: &str, chunk_chars: usize) -> Vec<String> {
    let chunk_chars = chunk_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Translates turn events into wire frames for one stream.
#[derive(Debug, Clone)]
pub struct FrameTranslator {
    stream_id: String,
    chunk_chars: usize,
}

impl FrameTranslator {
    pub fn new(stream_id: impl Into<String>, chunk_chars: usize) -> Self {
        Self {
            stream_id: stream_id.into(),
            chunk_chars,
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn frames_for(&self, event: &TurnEvent) -> Vec<StreamFrame> {
        match event {
            TurnEvent::NodeStarted { node } => vec![StreamFrame::Node {
                stream_id: self.stream_id.clone(),
                node: node.as_str().to_string(),
                timestamp: unix_timestamp(),
            }],
            TurnEvent::PassagesRetrieved { count } => vec![StreamFrame::Tool {
                stream_id: self.stream_id.clone(),
                node: Node::RagExecutor.as_str().to_string(),
                tool_result: format!("Retrieved {count} items"),
                timestamp: unix_timestamp(),
            }],
            TurnEvent::ReplyGenerated { content, usage } => {
                let node = Node::GeneralMessage.as_str().to_string();
                let mut sent = 0;
                let mut frames: Vec<StreamFrame> = chunk_reply(content, self.chunk_chars)
                    .into_iter()
                    .map(|piece| {
                        sent += piece.chars().count();
                        StreamFrame::Token {
                            stream_id: self.stream_id.clone(),
                            node: node.clone(),
                            content: piece,
                            tokens_so_far: sent,
                            timestamp: unix_timestamp(),
                        }
                    })
                    .collect();
                frames.push(StreamFrame::Message {
                    stream_id: self.stream_id.clone(),
                    node,
                    content: content.clone(),
                    complete: true,
                });
                frames.push(StreamFrame::Usage {
                    stream_id: self.stream_id.clone(),
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                    total_tokens: usage.total_tokens,
                    complete: true,
                });
                frames
            }
        }
    }

    pub fn complete(&self) -> StreamFrame {
        StreamFrame::Complete {
            stream_id: self.stream_id.clone(),
            message: STREAM_COMPLETE_MESSAGE.to_string(),
            timestamp: unix_timestamp(),
        }
    }

    pub fn error(&self) -> StreamFrame {
        StreamFrame::Error {
            stream_id: self.stream_id.clone(),
            message: STREAM_ERROR_MESSAGE.to_string(),
            timestamp: unix_timestamp(),
        }
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn to_event(frame: &StreamFrame) -> Event {
    Event::default()
        .json_data(frame)
        .unwrap_or_else(|_| Event::default().data("{}"))
}

/// Runs `command` in the background and streams its frames.
///
/// The stream ends after a `complete` or `error` frame.
pub fn turn_stream(
    orchestrator: ConversationOrchestrator,
    command: RunTurnCommand,
    chunk_chars: usize,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    let translator = FrameTranslator::new(
        format!("stream-{}", Uuid::new_v4().simple()),
        chunk_chars,
    );
    let (frame_tx, frame_rx) = mpsc::unbounded_channel::<StreamFrame>();

    let task = tokio::spawn(async move {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<TurnEvent>();

        let forward = async {
            while let Some(event) = event_rx.recv().await {
                for frame in translator.frames_for(&event) {
                    if frame_tx.send(frame).is_err() {
                        return;
                    }
                }
            }
        };
        let (result, ()) =
            futures::future::join(orchestrator.handle(command, Some(event_tx)), forward).await;

        let last = match result {
            Ok(_) => translator.complete(),
            Err(err) => {
                tracing::error!(
                    stream_id = translator.stream_id(),
                    error = %err,
                    "streamed turn failed"
                );
                translator.error()
            }
        };
        let _ = frame_tx.send(last);
    });

    futures::stream::unfold(
        (frame_rx, AbortOnDrop(task)),
        |(mut frames, guard)| async move {
            let frame = frames.recv().await?;
            Some((Ok(to_event(&frame)), (frames, guard)))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TokenUsage;

    #[test]
    fn chunk_reply_splits_on_char_boundaries() {
        let chunks = chunk_reply("héllo wörld, ça va?", 5);
        assert_eq!(chunks.concat(), "héllo wörld, ça va?");
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
    }

    #[test]
    fn chunk_reply_of_empty_text_is_empty() {
        assert!(chunk_reply("", 10).is_empty());
    }

    #[test]
    fn node_event_becomes_node_frame() {
        let translator = FrameTranslator::new("s1", 10);
        let frames = translator.frames_for(&TurnEvent::NodeStarted {
            node: Node::IntentClassifier,
        });
        assert!(matches!(
            &frames[..],
            [StreamFrame::Node { node, .. }] if node == "intent_classifier"
        ));
    }

    #[test]
    fn retrieval_event_reports_item_count() {
        let translator = FrameTranslator::new("s1", 10);
        let frames = translator.frames_for(&TurnEvent::PassagesRetrieved { count: 4 });
        assert!(matches!(
            &frames[..],
            [StreamFrame::Tool { tool_result, node, .. }]
                if tool_result == "Retrieved 4 items" && node == "rag_executor"
        ));
    }

    #[test]
    fn reply_event_streams_tokens_then_message_then_usage() {
        let translator = FrameTranslator::new("s1", 10);
        let reply = "We have shipped several React storefronts.";
        let frames = translator.frames_for(&TurnEvent::ReplyGenerated {
            content: reply.to_string(),
            usage: TokenUsage::new(120, 30),
        });

        let tokens: Vec<&StreamFrame> = frames
            .iter()
            .filter(|f| matches!(f, StreamFrame::Token { .. }))
            .collect();
        assert_eq!(tokens.len(), 5);
        match tokens.last() {
            Some(StreamFrame::Token { tokens_so_far, .. }) => {
                assert_eq!(*tokens_so_far, reply.chars().count())
            }
            other => panic!("unexpected frame: {other:?}"),
        }

        let n = frames.len();
        assert!(matches!(
            &frames[n - 2],
            StreamFrame::Message { content, complete: true, .. } if content == reply
        ));
        assert!(matches!(
            frames[n - 1],
            StreamFrame::Usage {
                input_tokens: 120,
                output_tokens: 30,
                total_tokens: 150,
                ..
            }
        ));
    }

    #[test]
    fn error_frame_hides_details() {
        let translator = FrameTranslator::new("s1", 10);
        match translator.error() {
            StreamFrame::Error { message, .. } => assert_eq!(message, STREAM_ERROR_MESSAGE),
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}
