//! Turn State
//!
//! The mutable record threaded through the graph for one turn. Every write
//! goes through a method that enforces the turn's invariants: a single
//! classification, at most one retrieval, and exactly one reply.

use crate::domain::conversation::{ConversationHistory, Message, Role};
use crate::domain::knowledge::Passage;
use crate::domain::routing::{Classification, Route};

use super::errors::TurnError;
use super::graph::Node;

/// Greeting used when a turn starts without any human message.
pub const DEFAULT_GREETING: &str = "Hello";

/// State of one in-progress turn.
#[derive(Debug, Clone)]
pub struct TurnState {
    message_history: ConversationHistory,
    current_turn_messages: Vec<Message>,
    user_message: Option<String>,
    classification: Option<Classification>,
    route: Option<Route>,
    retrieved_passages: Vec<Passage>,
    retrieval_attempted: bool,
    final_response: Option<String>,
    response_generated: bool,
    visited: Vec<Node>,
}

impl TurnState {
    /// Starts a turn over the accumulated history.
    pub fn new(message_history: ConversationHistory) -> Self {
        Self {
            message_history,
            current_turn_messages: Vec::new(),
            user_message: None,
            classification: None,
            route: None,
            retrieved_passages: Vec::new(),
            retrieval_attempted: false,
            final_response: None,
            response_generated: false,
            visited: Vec::new(),
        }
    }

    // ─── node effects ────────────────────────────────────────────────────

    /// `read_message`: extracts the latest human message.
    ///
    /// An empty history gets [`DEFAULT_GREETING`] appended as the human
    /// message so the generator always has something to answer.
    pub fn read_message(&mut self) -> &str {
        let user_message = match self.message_history.last_human() {
            Some(message) => message.content.clone(),
            None => {
                self.message_history.append(Message::human(DEFAULT_GREETING));
                DEFAULT_GREETING.to_string()
            }
        };

        self.current_turn_messages = vec![Message::human(user_message.clone())];
        self.response_generated = false;
        self.user_message.insert(user_message).as_str()
    }

    /// `intent_classifier`: stores the classification and derives the route.
    pub fn record_classification(
        &mut self,
        classification: Classification,
    ) -> Result<Route, TurnError> {
        if self.classification.is_some() {
            return Err(TurnError::ClassificationAlreadySet);
        }
        let route = classification.route();
        self.classification = Some(classification);
        self.route = Some(route);
        Ok(route)
    }

    /// `rag_executor`: stores the retrieved passages (possibly none).
    pub fn record_passages(&mut self, passages: Vec<Passage>) -> Result<(), TurnError> {
        if self.retrieval_attempted {
            return Err(TurnError::RetrievalAlreadyRan);
        }
        self.retrieval_attempted = true;
        self.retrieved_passages = passages;
        Ok(())
    }

    /// `general_message`: appends the single assistant reply for this turn.
    pub fn record_reply(&mut self, reply: impl Into<String>) -> Result<(), TurnError> {
        if self.response_generated {
            return Err(TurnError::DuplicateReply);
        }
        let reply = reply.into();
        let message = Message::assistant(reply.clone());

        self.message_history.append(message.clone());
        self.current_turn_messages = vec![message];
        self.final_response = Some(reply);
        self.response_generated = true;
        Ok(())
    }

    pub(crate) fn mark_visited(&mut self, node: Node) {
        self.visited.push(node);
    }

    // ─── accessors ───────────────────────────────────────────────────────

    pub fn message_history(&self) -> &ConversationHistory {
        &self.message_history
    }

    pub(crate) fn current_turn_messages(&self) -> &[Message] {
        &self.current_turn_messages
    }

    pub fn user_message(&self) -> Option<&str> {
        self.user_message.as_deref()
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn route(&self) -> Option<Route> {
        self.route
    }

    pub fn retrieved_passages(&self) -> &[Passage] {
        &self.retrieved_passages
    }

    pub fn retrieval_attempted(&self) -> bool {
        self.retrieval_attempted
    }

    pub fn final_response(&self) -> Option<&str> {
        self.final_response.as_deref()
    }

    pub fn response_generated(&self) -> bool {
        self.response_generated
    }

    /// Nodes entered so far, in order.
    pub fn visited(&self) -> &[Node] {
        &self.visited
    }

    /// Assistant messages in the whole history.
    pub fn assistant_message_count(&self) -> usize {
        self.message_history.count_role(Role::Assistant)
    }

    /// Consumes the state, yielding the history to persist.
    pub fn into_history(self) -> ConversationHistory {
        self.message_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::PassageMetadata;
    use crate::domain::routing::{Intent, Urgency};

    fn history_with(messages: &[Message]) -> ConversationHistory {
        ConversationHistory::from_messages(messages.to_vec())
    }

    #[test]
    fn read_message_takes_latest_human_message() {
        let mut state = TurnState::new(history_with(&[
            Message::human("first"),
            Message::assistant("reply"),
            Message::human("second"),
        ]));

        assert_eq!(state.read_message(), "second");
        assert_eq!(state.current_turn_messages().len(), 1);
        assert!(!state.response_generated());
    }

    #[test]
    fn read_message_rereads_previous_human_message_when_none_is_new() {
        let mut state = TurnState::new(history_with(&[
            Message::human("What stacks do you use?"),
            Message::assistant("Mostly Rust and TypeScript."),
        ]));

        assert_eq!(state.read_message(), "What stacks do you use?");
        assert_eq!(state.message_history().len(), 2);
    }

    #[test]
    fn read_message_synthesizes_greeting_for_empty_history() {
        let mut state = TurnState::new(ConversationHistory::new());

        assert_eq!(state.read_message(), DEFAULT_GREETING);
        assert_eq!(state.message_history().len(), 1);
        assert!(state.message_history().messages()[0].is_human());
    }

    #[test]
    fn classification_is_recorded_once() {
        let mut state = TurnState::new(history_with(&[Message::human("hi")]));
        let c = Classification::new(Intent::GeneralChat, Urgency::Low, "", "");

        assert_eq!(state.record_classification(c.clone()), Ok(Route::GeneralMessage));
        assert_eq!(
            state.record_classification(c),
            Err(TurnError::ClassificationAlreadySet)
        );
    }

    #[test]
    fn retrieval_records_attempt_even_when_empty() {
        let mut state = TurnState::new(ConversationHistory::new());
        state.record_passages(Vec::new()).unwrap();

        assert!(state.retrieval_attempted());
        assert!(state.retrieved_passages().is_empty());
        assert_eq!(state.record_passages(Vec::new()), Err(TurnError::RetrievalAlreadyRan));
    }

    #[test]
    fn reply_appends_exactly_one_assistant_message() {
        let mut state = TurnState::new(history_with(&[Message::human("hi")]));
        state.read_message();
        state.record_reply("Hello there!").unwrap();

        assert!(state.response_generated());
        assert_eq!(state.final_response(), Some("Hello there!"));
        assert_eq!(state.assistant_message_count(), 1);
        assert!(state.current_turn_messages()[0].is_assistant());
    }

    #[test]
    fn second_reply_is_rejected() {
        let mut state = TurnState::new(history_with(&[Message::human("hi")]));
        state.record_reply("one").unwrap();

        assert_eq!(state.record_reply("two"), Err(TurnError::DuplicateReply));
        assert_eq!(state.assistant_message_count(), 1);
        assert_eq!(state.final_response(), Some("one"));
    }

    #[test]
    fn history_accumulates_across_turns() {
        let mut state = TurnState::new(history_with(&[Message::human("one")]));
        state.read_message();
        state.record_reply("first reply").unwrap();
        let mut history = state.into_history();

        history.append(Message::human("two"));
        let mut next = TurnState::new(history);
        assert_eq!(next.read_message(), "two");
        next.record_reply("second reply").unwrap();

        assert_eq!(next.message_history().len(), 4);
        assert_eq!(next.assistant_message_count(), 2);
    }

    #[test]
    fn passages_are_kept_in_order() {
        let mut state = TurnState::new(ConversationHistory::new());
        let passages = vec![
            Passage::derived("s", "a", PassageMetadata::new()),
            Passage::derived("s", "b", PassageMetadata::new()),
        ];
        state.record_passages(passages).unwrap();

        let contents: Vec<_> = state.retrieved_passages().iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }
}
