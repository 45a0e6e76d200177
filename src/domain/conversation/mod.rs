//! Conversation module - Role-tagged messages and the append-only history
//! that is threaded across turns of a single conversation.

mod history;
mod message;

pub use history::ConversationHistory;
pub use message::{Message, Role};
