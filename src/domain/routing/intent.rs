//! Intent and urgency labels, and the routing decision derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A label that does not belong to a closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} label: {label:?}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}

/// Normalizes model output such as `"Knowledge Search"` or `"how-it-works"`.
fn normalize(label: &str) -> String {
    label
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.')
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

/// What the user is trying to do with their message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Questions about projects, technologies, services or past work.
    KnowledgeSearch,
    /// Reports of something broken.
    BugOrIssue,
    /// Conceptual or explanatory questions.
    HowItWorks,
    /// Comparing technologies, frameworks or tools.
    Comparison,
    /// Asking the assistant to produce or analyze something.
    TaskRequest,
    /// Greetings, thanks, small talk or unclear messages.
    GeneralChat,
}

impl Intent {
    /// Every member of the closed set.
    pub const ALL: [Intent; 6] = [
        Intent::KnowledgeSearch,
        Intent::BugOrIssue,
        Intent::HowItWorks,
        Intent::Comparison,
        Intent::TaskRequest,
        Intent::GeneralChat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::KnowledgeSearch => "knowledge_search",
            Intent::BugOrIssue => "bug_or_issue",
            Intent::HowItWorks => "how_it_works",
            Intent::Comparison => "comparison",
            Intent::TaskRequest => "task_request",
            Intent::GeneralChat => "general_chat",
        }
    }

    /// Which path of the turn graph this intent takes.
    pub fn route(&self) -> Route {
        match self {
            Intent::KnowledgeSearch
            | Intent::Comparison
            | Intent::HowItWorks
            | Intent::TaskRequest => Route::RagExecutor,
            Intent::GeneralChat | Intent::BugOrIssue => Route::GeneralMessage,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == normalized)
            .ok_or_else(|| UnknownLabel {
                kind: "intent",
                label: s.to_string(),
            })
    }
}

/// How pressing the user's message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Low,
    Medium,
    High,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::Low, Urgency::Medium, Urgency::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Urgency::ALL
            .into_iter()
            .find(|urgency| urgency.as_str() == normalized)
            .ok_or_else(|| UnknownLabel {
                kind: "urgency",
                label: s.to_string(),
            })
    }
}

/// The branch taken after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Retrieve grounding passages, then generate.
    RagExecutor,
    /// Generate directly.
    GeneralMessage,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::RagExecutor => "rag_executor",
            Route::GeneralMessage => "general_message",
        }
    }

    pub fn requires_retrieval(&self) -> bool {
        matches!(self, Route::RagExecutor)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
