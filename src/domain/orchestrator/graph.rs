//! The turn graph: nodes and their successor rules.

use serde::Serialize;
use std::fmt;

use super::errors::TurnError;
use super::turn_state::TurnState;

/// A vertex of the turn graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    ReadMessage,
    IntentClassifier,
    Router,
    RagExecutor,
    GeneralMessage,
    End,
}

impl Node {
    /// Entry point of every turn.
    pub const START: Node = Node::ReadMessage;

    pub fn as_str(&self) -> &'static str {
        match self {
            Node::ReadMessage => "read_message",
            Node::IntentClassifier => "intent_classifier",
            Node::Router => "router",
            Node::RagExecutor => "rag_executor",
            Node::GeneralMessage => "general_message",
            Node::End => "end",
        }
    }

    /// The node that follows `self`, given what the turn has recorded so far.
    ///
    /// `general_message` is the only predecessor of `End`, and it can only
    /// advance once a reply exists.
    pub fn successor(self, state: &TurnState) -> Result<Node, TurnError> {
        match self {
            Node::ReadMessage => Ok(Node::IntentClassifier),
            Node::IntentClassifier => match state.classification() {
                Some(_) => Ok(Node::Router),
                None => Err(TurnError::MissingState {
                    node: self.as_str(),
                    missing: "a classification",
                }),
            },
            Node::Router => match state.route() {
                Some(route) if route.requires_retrieval() => Ok(Node::RagExecutor),
                Some(_) => Ok(Node::GeneralMessage),
                None => Err(TurnError::MissingState {
                    node: self.as_str(),
                    missing: "a routing decision",
                }),
            },
            Node::RagExecutor => Ok(Node::GeneralMessage),
            Node::GeneralMessage => {
                if state.response_generated() {
                    Ok(Node::End)
                } else {
                    Err(TurnError::MissingState {
                        node: self.as_str(),
                        missing: "a generated reply",
                    })
                }
            }
            Node::End => Err(TurnError::Finished),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{ConversationHistory, Message};
    use crate::domain::routing::{Classification, Intent, Urgency};

    /// Walks the graph with canned node effects and returns the visited path.
    fn walk(intent: Intent) -> Vec<Node> {
        let mut state = TurnState::new(ConversationHistory::from_messages(vec![Message::human(
            "question",
        )]));
        let mut node = Node::START;
        let mut path = Vec::new();

        while node != Node::End {
            path.push(node);
            match node {
                Node::ReadMessage => {
                    state.read_message();
                }
                Node::IntentClassifier => {
                    state
                        .record_classification(Classification::new(intent, Urgency::Low, "t", "s"))
                        .unwrap();
                }
                Node::Router => {}
                Node::RagExecutor => state.record_passages(Vec::new()).unwrap(),
                Node::GeneralMessage => state.record_reply("reply").unwrap(),
                Node::End => unreachable!(),
            }
            node = node.successor(&state).unwrap();
        }
        path
    }

    #[test]
    fn retrieval_intents_pass_through_rag_executor_once() {
        for intent in [
            Intent::KnowledgeSearch,
            Intent::Comparison,
            Intent::HowItWorks,
            Intent::TaskRequest,
        ] {
            assert_eq!(
                walk(intent),
                vec![
                    Node::ReadMessage,
                    Node::IntentClassifier,
                    Node::Router,
                    Node::RagExecutor,
                    Node::GeneralMessage,
                ],
                "{intent}"
            );
        }
    }

    #[test]
    fn conversational_intents_skip_rag_executor() {
        for intent in [Intent::GeneralChat, Intent::BugOrIssue] {
            assert_eq!(
                walk(intent),
                vec![
                    Node::ReadMessage,
                    Node::IntentClassifier,
                    Node::Router,
                    Node::GeneralMessage,
                ],
                "{intent}"
            );
        }
    }

    #[test]
    fn every_path_visits_general_message_exactly_once() {
        for intent in Intent::ALL {
            let path = walk(intent);
            assert_eq!(path.iter().filter(|n| **n == Node::GeneralMessage).count(), 1);
            assert_eq!(path.last(), Some(&Node::GeneralMessage));
        }
    }

    #[test]
    fn router_requires_a_decision() {
        let state = TurnState::new(ConversationHistory::new());
        assert!(matches!(
            Node::Router.successor(&state),
            Err(TurnError::MissingState { node: "router", .. })
        ));
    }

    #[test]
    fn general_message_cannot_end_without_reply() {
        let state = TurnState::new(ConversationHistory::new());
        assert!(Node::GeneralMessage.successor(&state).is_err());
    }

    #[test]
    fn end_has_no_successor() {
        let state = TurnState::new(ConversationHistory::new());
        assert_eq!(Node::End.successor(&state), Err(TurnError::Finished));
    }

    #[test]
    fn node_names_match_wire_labels() {
        assert_eq!(Node::IntentClassifier.to_string(), "intent_classifier");
        assert_eq!(serde_json::to_string(&Node::RagExecutor).unwrap(), "\"rag_executor\"");
    }
}
