//! The master taxonomy: five evidence categories every passage is filed under.

use serde::{Deserialize, Serialize};

use crate::domain::knowledge::{keys, truncate_chars, Passage, PassageMetadata};

/// One master taxonomy category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxonomyCategory {
    pub name: &'static str,
    /// The client question this category answers.
    pub purpose: &'static str,
    pub keywords: &'static [&'static str],
    pub evidence: &'static str,
    /// Canned question used to probe retrieval after ingestion.
    pub probe: &'static str,
}

pub static MASTER_TAXONOMY: [TaxonomyCategory; 5] = [
    TaxonomyCategory {
        name: "Technical_Capability",
        purpose: "Do you know X? How do you build Y?",
        keywords: &[
            "Node.js", "React", "MERN", "AWS", "Auto-scaling", "Shopify API", "Klaviyo",
            "MongoDB", "PostgreSQL", "GraphQL", "Headless",
        ],
        evidence: "Architecture Implementation",
        probe: "Do you have React and Node.js experience?",
    },
    TaxonomyCategory {
        name: "Domain_Expertise",
        purpose: "Industry experience & functionality",
        keywords: &[
            "SaaS", "E-commerce", "Cybersecurity", "LMS", "Dashboard", "Influencer Marketing",
            "Phishing", "Multi-tenant",
        ],
        evidence: "Functional Case Study",
        probe: "Can you build SaaS dashboards?",
    },
    TaxonomyCategory {
        name: "Business_Impact_Trust",
        purpose: "Why trust you? Startup experience?",
        keywords: &[
            "Startup", "Scale", "Growth", "ROI", "5-star rating", "Reviews", "Series A",
            "Success Story", "Retention",
        ],
        evidence: "Social Proof / Metrics",
        probe: "Have you worked with startups?",
    },
    TaxonomyCategory {
        name: "Engagement_Hiring",
        purpose: "Resource availability & hiring models",
        keywords: &[
            "Hire Dedicated Developer", "Team Augmentation", "Fixed Cost", "Hourly Model",
            "Full-time", "Resource availability", "Staffing",
        ],
        evidence: "Service Offering",
        probe: "Do you offer team augmentation?",
    },
    TaxonomyCategory {
        name: "Process_Communication",
        purpose: "How do we work? NDAs? Communication?",
        keywords: &[
            "Agile", "Sprint", "Slack", "Trello", "Jira", "NDA", "Confidentiality",
            "Discovery Call", "Quote", "Estimation",
        ],
        evidence: "Workflow / Protocol",
        probe: "What is your Agile process?",
    },
];

/// Category given to section chunks that match no taxonomy keyword.
pub const DEFAULT_SECTION_CATEGORY: &str = "Domain_Expertise";

const MAX_CONTENT_CHARS: usize = 1000;
const MAX_SUB_TYPE_CHARS: usize = 50;
const MAX_PROJECT_REF_CHARS: usize = 100;
const MAX_KEYWORDS: usize = 10;

pub fn find_category(name: &str) -> Option<&'static TaxonomyCategory> {
    MASTER_TAXONOMY.iter().find(|c| c.name == name)
}

/// Best-matching category for a piece of text and the keywords that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub category: &'static TaxonomyCategory,
    pub matched_keywords: Vec<&'static str>,
}

/// Files text under the category with the most keyword hits.
///
/// Ties go to the earlier category; no hits at all falls back to
/// [`DEFAULT_SECTION_CATEGORY`].
pub fn categorize(text: &str) -> CategoryMatch {
    let lowercase = text.to_lowercase();
    let mut best: Option<CategoryMatch> = None;

    for category in MASTER_TAXONOMY.iter() {
        let matched: Vec<&'static str> = category
            .keywords
            .iter()
            .copied()
            .filter(|k| lowercase.contains(&k.to_lowercase()))
            .collect();
        if matched.is_empty() {
            continue;
        }
        let better = best
            .as_ref()
            .map_or(true, |b| matched.len() > b.matched_keywords.len());
        if better {
            best = Some(CategoryMatch {
                category,
                matched_keywords: matched,
            });
        }
    }

    best.unwrap_or_else(|| CategoryMatch {
        category: &MASTER_TAXONOMY[1],
        matched_keywords: Vec::new(),
    })
}

// ============================================================================
// LLM extraction
// ============================================================================

/// Evidence paragraph as returned by the extraction model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEvidence {
    pub content: String,
    pub metadata: ExtractedMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub project_ref: Option<String>,
}

impl ExtractedEvidence {
    /// Placeholder used when extraction for a category fails.
    pub fn fallback(category: &TaxonomyCategory) -> Self {
        Self {
            content: format!("No {} evidence found in portfolio.", category.name),
            metadata: ExtractedMetadata {
                category: category.name.to_string(),
                sub_type: Some("fallback".to_string()),
                keywords: Vec::new(),
                project_ref: Some("N/A".to_string()),
            },
        }
    }
}

/// Extraction prompt for one category over the whole portfolio JSON.
pub fn extraction_prompt(
    category: &TaxonomyCategory,
    organization: &str,
    portfolio_json: &str,
) -> String {
    format!(
        r#"You are analyzing {organization}'s project portfolio for {name}.

CATEGORY PURPOSE: {purpose}
KEYWORD TRIGGERS: {keywords}
EVIDENCE TYPE: {evidence}

TASK: Extract ONE paragraph from the project JSON that BEST demonstrates this capability.
- Use ONLY facts from the JSON
- Reference specific project names and technologies
- Keep it concise (100-200 words)
- Make it query-answer ready

PROJECT JSON:
{portfolio_json}

Respond with JSON only: {{"content": "...", "metadata": {{"category": "{name}", "sub_type": "...", "keywords": ["3-5 exact phrases"], "project_ref": "specific project name"}}}}"#,
        name = category.name,
        purpose = category.purpose,
        keywords = category.keywords.join(", "),
        evidence = category.evidence,
    )
}

pub fn extraction_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "content": { "type": "string" },
            "metadata": {
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "enum": MASTER_TAXONOMY.iter().map(|c| c.name).collect::<Vec<_>>()
                    },
                    "sub_type": { "type": "string" },
                    "keywords": { "type": "array", "items": { "type": "string" } },
                    "project_ref": { "type": "string" }
                },
                "required": ["category", "sub_type", "keywords", "project_ref"],
                "additionalProperties": false
            }
        },
        "required": ["content", "metadata"],
        "additionalProperties": false
    })
}

// ============================================================================
// Validation
// ============================================================================

/// A store-ready taxonomy chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyChunk {
    pub content: String,
    pub category: &'static str,
    pub sub_type: String,
    pub keywords: String,
    pub project_ref: String,
    pub evidence_type: &'static str,
}

impl TaxonomyChunk {
    fn missing(category: &'static TaxonomyCategory) -> Self {
        Self {
            content: format!("[{}] Portfolio data pending for this category.", category.name),
            category: category.name,
            sub_type: "missing".to_string(),
            keywords: String::new(),
            project_ref: "N/A".to_string(),
            evidence_type: category.evidence,
        }
    }

    /// Converts to a passage with the provenance fields attached.
    pub fn into_passage(self, chunk_id: usize, created_at: &str, source: &str) -> Passage {
        let metadata = PassageMetadata::new()
            .with(keys::CATEGORY, self.category)
            .with(keys::SUB_TYPE, self.sub_type)
            .with(keys::KEYWORDS, self.keywords)
            .with(keys::PROJECT_REF, self.project_ref)
            .with(keys::EVIDENCE_TYPE, self.evidence_type)
            .with(keys::CHUNK_ID, chunk_id)
            .with(keys::TAXONOMY_SCORE, 1.0)
            .with(keys::CREATED_AT, created_at)
            .with(keys::SOURCE, source);
        Passage::derived(&format!("{source}::{}", self.category), self.content, metadata)
    }
}

/// Validates extracted evidence and fills in any category left uncovered.
///
/// Entries naming an unknown category or with blank content are dropped.
/// The result always covers all five categories.
pub fn validate_evidence(extracted: Vec<ExtractedEvidence>) -> Vec<TaxonomyChunk> {
    let mut chunks = Vec::new();
    let mut covered: Vec<&'static str> = Vec::new();

    for evidence in extracted {
        let Some(category) = find_category(evidence.metadata.category.trim()) else {
            tracing::debug!(category = %evidence.metadata.category, "dropping evidence with unknown category");
            continue;
        };
        let content = truncate_chars(evidence.content.trim(), MAX_CONTENT_CHARS);
        if content.is_empty() {
            continue;
        }

        let keywords = evidence
            .metadata
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .take(MAX_KEYWORDS)
            .collect::<Vec<_>>()
            .join(", ");

        chunks.push(TaxonomyChunk {
            content,
            category: category.name,
            sub_type: truncate_chars(
                evidence.metadata.sub_type.as_deref().unwrap_or("unknown"),
                MAX_SUB_TYPE_CHARS,
            ),
            keywords,
            project_ref: truncate_chars(
                evidence.metadata.project_ref.as_deref().unwrap_or("unknown"),
                MAX_PROJECT_REF_CHARS,
            ),
            evidence_type: category.evidence,
        });
        if !covered.contains(&category.name) {
            covered.push(category.name);
        }
    }

    for category in MASTER_TAXONOMY.iter() {
        if !covered.contains(&category.name) {
            tracing::warn!(category = category.name, "taxonomy category missing, inserting placeholder");
            chunks.push(TaxonomyChunk::missing(category));
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(category: &str, content: &str) -> ExtractedEvidence {
        ExtractedEvidence {
            content: content.to_string(),
            metadata: ExtractedMetadata {
                category: category.to_string(),
                sub_type: Some("case study".to_string()),
                keywords: vec!["React".to_string(), " AWS ".to_string()],
                project_ref: Some("Phishing Trainer".to_string()),
            },
        }
    }

    #[test]
    fn categorize_picks_most_keyword_hits() {
        let m = categorize("We use Agile sprints tracked in Jira, with a React front end.");
        assert_eq!(m.category.name, "Process_Communication");
        assert_eq!(m.matched_keywords, vec!["Agile", "Sprint", "Jira"]);
    }

    #[test]
    fn categorize_defaults_to_domain_expertise() {
        let m = categorize("nothing relevant here");
        assert_eq!(m.category.name, DEFAULT_SECTION_CATEGORY);
        assert!(m.matched_keywords.is_empty());
    }

    #[test]
    fn validation_fills_missing_categories() {
        let chunks = validate_evidence(vec![evidence("Technical_Capability", "Built on React")]);

        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0].keywords, "React, AWS");
        assert_eq!(chunks[0].evidence_type, "Architecture Implementation");

        let missing = chunks.iter().find(|c| c.category == "Engagement_Hiring").unwrap();
        assert_eq!(missing.sub_type, "missing");
        assert_eq!(
            missing.content,
            "[Engagement_Hiring] Portfolio data pending for this category."
        );
    }

    #[test]
    fn validation_drops_unknown_categories_and_truncates() {
        let long = "x".repeat(1500);
        let mut e = evidence("Domain_Expertise", &long);
        e.metadata.sub_type = Some("s".repeat(80));
        e.metadata.keywords = (0..20).map(|i| format!("k{i}")).collect();

        let chunks = validate_evidence(vec![evidence("Made_Up", "ignored"), e]);
        let domain = &chunks[0];

        assert_eq!(chunks.len(), 5);
        assert_eq!(domain.content.chars().count(), 1000);
        assert_eq!(domain.sub_type.chars().count(), 50);
        assert_eq!(domain.keywords.split(", ").count(), 10);
        assert!(chunks.iter().all(|c| c.content != "ignored"));
    }

    #[test]
    fn fallback_evidence_names_category() {
        let fallback = ExtractedEvidence::fallback(&MASTER_TAXONOMY[2]);
        assert_eq!(fallback.content, "No Business_Impact_Trust evidence found in portfolio.");

        let chunks = validate_evidence(vec![fallback]);
        assert_eq!(chunks[0].sub_type, "fallback");
        assert_eq!(chunks[0].project_ref, "N/A");
    }

    #[test]
    fn passage_carries_taxonomy_metadata() {
        let chunk = validate_evidence(vec![evidence("Technical_Capability", "Built on React")])
            .remove(0);
        let passage = chunk.into_passage(0, "2026-01-01T00:00:00Z", "portfolio");

        assert_eq!(passage.category(), "Technical_Capability");
        assert_eq!(passage.metadata.get(keys::TAXONOMY_SCORE).and_then(|v| v.as_f64()), Some(1.0));
        assert_eq!(passage.metadata.text(keys::SOURCE), Some("portfolio"));
    }

    #[test]
    fn extraction_prompt_mentions_category_and_json() {
        let prompt = extraction_prompt(&MASTER_TAXONOMY[0], "Acme", "{\"projects\":[]}");
        assert!(prompt.contains("Acme's project portfolio for Technical_Capability"));
        assert!(prompt.contains("{\"projects\":[]}"));
    }
}
