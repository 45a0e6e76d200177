//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps and validation errors that the rest of the
//! portfolio concierge domain is written in terms of.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{ConversationId, PassageId};
pub use timestamp::Timestamp;
