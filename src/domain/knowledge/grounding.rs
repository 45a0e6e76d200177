//! The grounding block: retrieved evidence handed to the response generator.

use super::passage::Passage;

/// Maximum passages folded into a grounding block.
pub const DEFAULT_GROUNDING_LIMIT: usize = 5;

/// Evidence available to the response generator for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grounding {
    /// Retrieved passages, rendered as `[category] content` blocks.
    Passages { block: String, count: usize },
    /// Retrieval ran but found nothing usable.
    Unavailable,
    /// The route never asked for retrieval.
    NotRequested,
}

impl Grounding {
    /// Builds the grounding for a turn from its retrieved passages.
    pub fn from_passages(passages: &[Passage], limit: usize, retrieval_attempted: bool) -> Self {
        let used: Vec<&Passage> = passages
            .iter()
            .filter(|p| !p.content.trim().is_empty())
            .take(limit)
            .collect();

        if used.is_empty() {
            return if retrieval_attempted {
                Grounding::Unavailable
            } else {
                Grounding::NotRequested
            };
        }

        let block = used
            .iter()
            .map(|p| format!("[{}] {}", p.category(), p.content.trim()))
            .collect::<Vec<_>>()
            .join("\n\n");

        Grounding::Passages {
            block,
            count: used.len(),
        }
    }

    pub fn has_grounding(&self) -> bool {
        matches!(self, Grounding::Passages { .. })
    }

    pub fn block(&self) -> Option<&str> {
        match self {
            Grounding::Passages { block, .. } => Some(block),
            _ => None,
        }
    }

    /// Number of passages folded into the block.
    pub fn passage_count(&self) -> usize {
        match self {
            Grounding::Passages { count, .. } => *count,
            _ => 0,
        }
    }
}
