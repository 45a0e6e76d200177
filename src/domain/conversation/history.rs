//! Append-only conversation history.

use serde::{Deserialize, Serialize};

use super::message::{Message, Role};

/// Ordered, append-only log of messages for one conversation.
///
/// Persisted between turns by the checkpoint store. Messages can only be
/// appended; there is no way to edit or remove one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a history from stored messages.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Appends a message to the end of the log.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent human message, if any.
    pub fn last_human(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_human())
    }

    /// Number of messages with the given role.
    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_history_is_empty() {
        let history = ConversationHistory::new();
        assert!(history.is_empty());
        assert!(history.last_human().is_none());
    }

    #[test]
    fn append_preserves_order() {
        let mut history = ConversationHistory::new();
        history.append(Message::human("one"));
        history.append(Message::assistant("two"));
        history.append(Message::human("three"));

        let contents: Vec<_> = history.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[test]
    fn last_human_skips_assistant_messages() {
        let mut history = ConversationHistory::new();
        history.append(Message::human("question"));
        history.append(Message::assistant("answer"));

        assert_eq!(history.last_human().unwrap().content, "question");
    }

    #[test]
    fn count_role_counts_each_role() {
        let mut history = ConversationHistory::new();
        history.append(Message::human("a"));
        history.append(Message::assistant("b"));
        history.append(Message::human("c"));

        assert_eq!(history.count_role(Role::Human), 2);
        assert_eq!(history.count_role(Role::Assistant), 1);
    }

    #[test]
    fn history_round_trips_through_yaml() {
        let mut history = ConversationHistory::new();
        history.append(Message::human("Do you use React?"));

        let yaml = serde_yaml::to_string(&history).unwrap();
        let restored: ConversationHistory = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored, history);
    }
}
