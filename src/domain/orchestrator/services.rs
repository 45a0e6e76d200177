//! Domain services consumed by the turn graph.
//!
//! The LLM-backed implementations live in `application::services`; the
//! keyword classifier here needs no external calls and backs offline mode.

use async_trait::async_trait;

use crate::domain::conversation::ConversationHistory;
use crate::domain::knowledge::{Grounding, Passage};
use crate::domain::routing::{Classification, Intent, Urgency};

use super::errors::{ClassificationError, GenerationError, RetrievalError};

/// Maps a free-text message onto the closed intent set.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, message: &str) -> Result<Classification, ClassificationError>;
}

/// Finds passages relevant to a search query.
///
/// An empty or unreachable store yields `Ok(vec![])`.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError>;
}

/// Produces the assistant reply for a turn.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(
        &self,
        history: &ConversationHistory,
        grounding: &Grounding,
    ) -> Result<GeneratedReply, GenerationError>;
}

/// A reply with the token usage it cost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedReply {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl GeneratedReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_usage(mut self, prompt_tokens: u32, completion_tokens: u32) -> Self {
        self.prompt_tokens = prompt_tokens;
        self.completion_tokens = completion_tokens;
        self
    }

    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Cue-word classifier for running without a language model.
///
/// Rules are checked in order; the first match wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntentClassifier;

const BUG_CUES: &[&str] = &["bug", "error", "broken", "crash", "not working", "doesn't work"];
const COMPARISON_CUES: &[&str] = &[" vs ", " vs. ", "versus", "compare", "comparison", "better than", "difference between"];
const HOW_CUES: &[&str] = &["how does", "how do", "how is", "explain", "what is the process"];
const TASK_CUES: &[&str] = &["build", "create", "write", "generate", "develop", "make me", "analyze"];
const KNOWLEDGE_CUES: &[&str] = &[
    "do you", "have you", "can you", "experience", "portfolio", "project", "stack",
    "technolog", "service", "worked", "guarantee", "delivery",
];
const GREETING_CUES: &[&str] = &["hi", "hello", "hey", "thanks", "thank you", "good morning", "good evening"];
const URGENT_CUES: &[&str] = &["urgent", "asap", "immediately", "right now", "emergency"];

fn contains_any(haystack: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| haystack.contains(cue))
}

fn is_greeting(lowercase: &str) -> bool {
    let words: Vec<&str> = lowercase
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    words.len() <= 4 && GREETING_CUES.iter().any(|cue| {
        let cue_words: Vec<&str> = cue.split(' ').collect();
        words.windows(cue_words.len()).any(|w| w == cue_words.as_slice())
    })
}

impl KeywordIntentClassifier {
    pub fn intent_for(&self, message: &str) -> Intent {
        let lowercase = format!(" {} ", message.to_lowercase());

        if is_greeting(&lowercase) {
            return Intent::GeneralChat;
        }
        if contains_any(&lowercase, BUG_CUES) {
            return Intent::BugOrIssue;
        }
        if contains_any(&lowercase, COMPARISON_CUES) {
            return Intent::Comparison;
        }
        if contains_any(&lowercase, HOW_CUES) {
            return Intent::HowItWorks;
        }
        if contains_any(&lowercase, KNOWLEDGE_CUES) {
            return Intent::KnowledgeSearch;
        }
        if contains_any(&lowercase, TASK_CUES) {
            return Intent::TaskRequest;
        }
        Intent::GeneralChat
    }

    fn urgency_for(&self, message: &str) -> Urgency {
        let lowercase = message.to_lowercase();
        if contains_any(&lowercase, URGENT_CUES) {
            Urgency::High
        } else {
            Urgency::Low
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordIntentClassifier {
    async fn classify(&self, message: &str) -> Result<Classification, ClassificationError> {
        let fallback = Classification::fallback(message);
        Ok(Classification::new(
            self.intent_for(message),
            self.urgency_for(message),
            fallback.topic,
            fallback.summary,
        ))
    }
}
