//! The structured record produced by intent classification.

use serde::{Deserialize, Serialize};

use super::intent::{Intent, Route, Urgency};

/// Longest topic kept when falling back to the raw message.
const FALLBACK_TOPIC_CHARS: usize = 80;
/// Longest summary kept when falling back to the raw message.
const FALLBACK_SUMMARY_CHARS: usize = 200;

/// Classifier output for one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub urgency: Urgency,
    pub topic: String,
    pub summary: String,
}

impl Classification {
    pub fn new(
        intent: Intent,
        urgency: Urgency,
        topic: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            intent,
            urgency,
            topic: topic.into(),
            summary: summary.into(),
        }
    }

    /// Classification used when the classifier fails: general chat, low urgency.
    pub fn fallback(message: &str) -> Self {
        let message = message.trim();
        Self {
            intent: Intent::GeneralChat,
            urgency: Urgency::Low,
            topic: message.chars().take(FALLBACK_TOPIC_CHARS).collect(),
            summary: message.chars().take(FALLBACK_SUMMARY_CHARS).collect(),
        }
    }

    pub fn route(&self) -> Route {
        self.intent.route()
    }

    /// Search query for the retriever: intent label followed by the topic.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.intent.as_str(), self.topic.trim())
            .trim()
            .to_string()
    }
}
