//! Portfolio page records and their conversion into section passages.

use serde::{Deserialize, Serialize};

use crate::domain::knowledge::{keys, Passage, PassageMetadata};

use super::splitter::TextSplitter;
use super::taxonomy::categorize;
use super::tech_catalog::{detect_tech_stack, flatten_tech_stack, TechStack};

/// Sections shorter than this carry no useful content.
pub const MIN_SECTION_CHARS: usize = 15;

/// Call-to-action headings that would dilute technical answers.
pub const NOISE_HEADINGS: [&str; 4] = ["Ready to Discuss?", "Get Started", "Contact Us", "Newsletter"];

pub const SOURCE_TYPE: &str = "portfolio";
pub const SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSection {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub content: String,
}

/// One already-extracted portfolio page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRecord {
    #[serde(default)]
    pub url: String,
    #[serde(default = "unknown_title")]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<PortfolioSection>,
    #[serde(default)]
    pub tech_stack: Option<TechStack>,
}

fn unknown_title() -> String {
    "Unknown Project".to_string()
}

/// Parses a record file holding either one record or an array of them.
pub fn parse_records(json: &str) -> Result<Vec<PortfolioRecord>, serde_json::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<PortfolioRecord>),
        One(PortfolioRecord),
    }

    Ok(match serde_json::from_str::<OneOrMany>(json)? {
        OneOrMany::Many(records) => records,
        OneOrMany::One(record) => vec![record],
    })
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_noise_heading(heading: &str) -> bool {
    NOISE_HEADINGS.iter().any(|noise| heading.contains(noise))
}

/// Lowercase, hyphen-separated form of arbitrary text.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

impl PortfolioRecord {
    /// Last path segment of the URL, or the slugified title without one.
    pub fn slug(&self) -> String {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&self.title))
    }

    /// The record's tech stack, detected from its prose when not supplied.
    pub fn technologies(&self) -> Vec<String> {
        match &self.tech_stack {
            Some(stack) if !stack.is_empty() => flatten_tech_stack(stack),
            _ => {
                let full_text = self
                    .sections
                    .iter()
                    .map(|s| s.content.as_str())
                    .chain(std::iter::once(self.title.as_str()))
                    .collect::<Vec<_>>()
                    .join(" ");
                flatten_tech_stack(&detect_tech_stack(&full_text))
            }
        }
    }

    /// Sections worth indexing, each with its context-injected text.
    pub fn section_documents(&self) -> Vec<SectionDocument> {
        let tech = self.technologies().join(", ");
        let slug = self.slug();

        self.sections
            .iter()
            .filter(|s| s.content.chars().count() >= MIN_SECTION_CHARS)
            .filter(|s| !is_noise_heading(&s.heading))
            .map(|section| {
                let content = collapse_whitespace(&section.content);
                let heading = collapse_whitespace(&section.heading);
                let text = format!(
                    "Project: {}\nTopic: {}\nTech: {}\n-----------------------\n{}",
                    self.title, heading, tech, content
                );
                let metadata = PassageMetadata::new()
                    .with(keys::DOC_ID, format!("portfolio::{slug}"))
                    .with(keys::SOURCE, self.url.as_str())
                    .with(keys::PROJECT_TITLE, self.title.as_str())
                    .with(keys::PROJECT_SLUG, slug.as_str())
                    .with(keys::SECTION_HEADING, heading.as_str())
                    .with(keys::PROJECT_REF, self.title.as_str())
                    .with(keys::IS_SUMMARY, false)
                    .with(keys::SOURCE_TYPE, SOURCE_TYPE)
                    .with(keys::VERSION, SCHEMA_VERSION);

                SectionDocument {
                    project_title: self.title.clone(),
                    heading,
                    content,
                    text,
                    metadata,
                }
            })
            .collect()
    }
}

/// A filtered section ready to be chunked.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDocument {
    pub project_title: String,
    pub heading: String,
    /// Whitespace-collapsed section body.
    pub content: String,
    /// Body with project, topic and tech lines prepended.
    pub text: String,
    pub metadata: PassageMetadata,
}

impl SectionDocument {
    fn source(&self) -> String {
        self.metadata.rendered(keys::DOC_ID)
    }

    /// Splits the section into passages filed under a taxonomy category.
    pub fn chunk(&self, splitter: &TextSplitter) -> Vec<Passage> {
        let category = categorize(&self.text);
        let keywords = category.matched_keywords.join(", ");
        let source = self.source();

        splitter
            .split_text(&self.text)
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let metadata = self
                    .metadata
                    .clone()
                    .with(keys::CHUNK_INDEX, index)
                    .with(keys::CHUNK_ID, format!("{}::chunk-{index}", self.project_title))
                    .with(keys::CATEGORY, category.category.name)
                    .with(keys::KEYWORDS, keywords.as_str())
                    .with(keys::EVIDENCE_TYPE, category.category.evidence);
                Passage::derived(&source, chunk, metadata)
            })
            .collect()
    }

    /// Wraps an LLM-written summary of the section as an extra passage.
    pub fn summary_passage(&self, summary: &str) -> Passage {
        let category = categorize(&self.text);
        let metadata = self
            .metadata
            .clone()
            .with(keys::IS_SUMMARY, true)
            .with(keys::CHUNK_INDEX, 0usize)
            .with(keys::CHUNK_ID, format!("{}::summary::{}", self.project_title, self.heading))
            .with(keys::CATEGORY, category.category.name)
            .with(keys::KEYWORDS, category.matched_keywords.join(", "))
            .with(keys::EVIDENCE_TYPE, category.category.evidence);
        Passage::derived(&self.source(), summary.trim(), metadata)
    }

    /// Prompt asking for a short client-facing summary.
    pub fn summary_prompt(&self) -> String {
        format!(
            "Summarize the following project section in 2-3 sentences, focusing on what was \
             built and why it matters to the client.\n\nSection title: {}\nContent:\n{}",
            self.heading, self.content
        )
    }
}
