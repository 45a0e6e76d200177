//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Identifier of a conversation thread.
///
/// Clients may supply their own thread identifiers, so this is a validated
/// string rather than a UUID: 1-128 characters of `[A-Za-z0-9_.:-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId(String);

impl ConversationId {
    /// Maximum accepted length.
    pub const MAX_LEN: usize = 128;

    /// Creates a ConversationId, validating its format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("conversation_id"));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(ValidationError::too_long(
                "conversation_id",
                Self::MAX_LEN,
                trimmed.len(),
            ));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        {
            return Err(ValidationError::invalid_format(
                "conversation_id",
                "only letters, digits, '_', '-', '.' and ':' are allowed",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Creates a new random ConversationId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ConversationId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConversationId> for String {
    fn from(id: ConversationId) -> Self {
        id.0
    }
}

/// Stable identifier of a passage in the knowledge store.
///
/// Derived from provenance and content so that re-ingesting the same source
/// reproduces the same identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassageId(String);

impl PassageId {
    /// Wraps an identifier read back from storage.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derives an identifier from the given parts (SHA-256, hex, first 32 chars).
    pub fn derive(parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update([0x1f]);
        }
        let digest = format!("{:x}", hasher.finalize());
        Self(digest[..32].to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PassageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_id_accepts_thread_style_ids() {
        let id = ConversationId::new("thread_42:web").unwrap();
        assert_eq!(id.as_str(), "thread_42:web");
    }

    #[test]
    fn conversation_id_trims_whitespace() {
        let id = ConversationId::new("  abc-1 ").unwrap();
        assert_eq!(id.to_string(), "abc-1");
    }

    #[test]
    fn conversation_id_rejects_empty() {
        assert!(matches!(
            ConversationId::new("   "),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn conversation_id_rejects_spaces_and_slashes() {
        assert!(ConversationId::new("a b").is_err());
        assert!(ConversationId::new("../etc").is_err());
    }

    #[test]
    fn conversation_id_rejects_overlong_values() {
        let long = "a".repeat(ConversationId::MAX_LEN + 1);
        assert!(matches!(
            ConversationId::new(long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn generated_conversation_ids_are_valid_and_unique() {
        let a = ConversationId::generate();
        let b = ConversationId::generate();
        assert_ne!(a, b);
        assert!(ConversationId::new(a.as_str()).is_ok());
    }

    #[test]
    fn conversation_id_deserialization_validates() {
        let ok: Result<ConversationId, _> = serde_json::from_str("\"abc\"");
        assert!(ok.is_ok());
        let bad: Result<ConversationId, _> = serde_json::from_str("\"a/b\"");
        assert!(bad.is_err());
    }

    #[test]
    fn passage_id_is_deterministic() {
        let a = PassageId::derive(&["source", "chunk-0", "content"]);
        let b = PassageId::derive(&["source", "chunk-0", "content"]);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn passage_id_separates_parts() {
        let a = PassageId::derive(&["ab", "c"]);
        let b = PassageId::derive(&["a", "bc"]);
        assert_ne!(a, b);
    }
}
