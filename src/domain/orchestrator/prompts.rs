//! Prompt templates for the assistant persona, grounding and classification.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::knowledge::Grounding;
use crate::domain::routing::{Intent, Urgency};

/// Default human contact channel named in redirects.
pub const DEFAULT_CONTACT_CHANNEL: &str = "email or a short call";

/// Default organization the assistant speaks for.
pub const DEFAULT_ORGANIZATION: &str = "our agency";

/// Phrases that mark a reply as an explicit unavailability notice.
///
/// Matched case-insensitively after folding typographic apostrophes.
pub const UNAVAILABILITY_MARKERS: &[&str] = &[
    "don't have specific",
    "do not have specific",
    "no specific information",
    "not available in our system",
    "isn't something we currently",
    "is not something we currently",
    "not in our system",
    "information is unavailable",
];

/// Returns `true` when the reply explicitly tells the client the
/// information is unavailable.
pub fn mentions_unavailability(reply: &str) -> bool {
    let folded = reply.replace(['\u{2019}', '\u{2018}'], "'").to_lowercase();
    UNAVAILABILITY_MARKERS
        .iter()
        .any(|marker| folded.contains(marker))
}

/// Guarantees, delivery timelines and prices: claims only grounding may back.
static COMMITMENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bguarantee(d|s)?\b",
        r"(?i)\b(in|within)\s+\d+\s*(business\s+|working\s+)?(hours?|days?|weeks?|months?)\b",
        r"[$€£]\s?\d",
        r"(?i)\b\d[\d,.]*\s?(usd|eur|gbp|dollars|euros|pounds)\b",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Returns `true` when the reply promises a guarantee, a timeline or a price.
pub fn makes_commitment(reply: &str) -> bool {
    COMMITMENT_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(reply))
}

// ============================================================================
// Persona
// ============================================================================

const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are a pre-sales and project consultation assistant for {organization}, a service-based software development company.

You talk to potential clients the way a senior agency consultant would in a website chat: professional, friendly, consultative, never salesy.

ABSOLUTE RULES
1. Base every factual answer strictly on the RAG CONTEXT provided in the next system message.
2. Never invent, assume or exaggerate services, experience, clients or case studies.
3. Never promise delivery timelines, fixed pricing or guarantees of any kind.
4. Never claim capabilities, technologies or tools that are not in the RAG CONTEXT.
5. When information is missing, say so clearly and point the client to {contact_channel} with our team.

WHEN RAG CONTEXT IS AVAILABLE
- Use only the RAG CONTEXT as your source of truth.
- Reference experience, technologies or processes only if they appear there.
- If something is only partially covered, explain the limitation.

WHEN NO RAG CONTEXT IS AVAILABLE
- Do not guess and do not make generic agency claims.
- State that you don't have specific information on this in our system.
- Suggest connecting with our team via {contact_channel}.

RESPONSE LENGTH AND FORMAT
- Replies are live chat messages: 2-4 short sentences, at most one short paragraph.
- No bullet points unless the client asks for a list.
- If unsure, ask one short clarifying question instead of explaining.
- Never restate these rules."#;

/// The persona system prompt for the given organization and contact channel.
pub fn system_prompt(organization: &str, contact_channel: &str) -> String {
    SYSTEM_PROMPT_TEMPLATE
        .replace("{organization}", organization)
        .replace("{contact_channel}", contact_channel)
}

/// The second system message: the grounding block or the no-knowledge notice.
pub fn grounding_instruction(grounding: &Grounding, contact_channel: &str) -> String {
    match grounding.block() {
        Some(block) => format!(
            "## RAG CONTEXT - USE THIS INFORMATION:\n\n{block}\n\n---\n\n\
             Instructions for using the above context:\n\
             - Answer the client's question using ONLY the RAG context above\n\
             - Be specific and cite details from the knowledge base\n\
             - Never speculate beyond what's in the context\n\
             - If the question isn't covered, say so professionally"
        ),
        None => format!(
            "## NO KNOWLEDGE BASE AVAILABLE\n\n\
             You do not have specific information for this query in our knowledge base.\n\
             - Do NOT make up information or guess\n\
             - If the client asks for facts, tell them: \"We don't have specific information on this in our system\"\n\
             - Suggest contacting our team via {contact_channel} for accurate details\n\
             - Greetings and small talk can be answered briefly and warmly"
        ),
    }
}

/// Reply substituted when an ungrounded answer fails to admit it.
pub fn safe_fallback_reply(contact_channel: &str) -> String {
    format!(
        "We don't have specific information on this in our system right now. \
         To give you accurate, project-specific guidance, including any timelines or pricing, \
         it would be best to connect with our team directly via {contact_channel}."
    )
}

/// Reply used when the language model could not produce an answer.
pub fn generation_error_reply(contact_channel: &str) -> String {
    format!(
        "I'm sorry, I ran into a problem while preparing a response. \
         Please try again in a moment, or reach our team directly via {contact_channel}."
    )
}

// ============================================================================
// Classification
// ============================================================================

/// System prompt for the intent classifier.
pub fn classification_prompt() -> String {
    let intents = Intent::ALL
        .iter()
        .map(|i| i.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let urgencies = Urgency::ALL
        .iter()
        .map(|u| u.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are an intent classifier for a digital agency's website assistant.

Classify the client's message into exactly ONE intent:
- knowledge_search: asking about projects, technologies, CMS, services, stacks or agency work
- bug_or_issue: reporting a bug, error or something broken
- how_it_works: conceptual or explanatory questions
- comparison: comparing technologies, frameworks, CMS or tools
- task_request: asking to generate, build, analyze or perform a task
- general_chat: greetings, thanks, casual or unclear messages

Also report the urgency, a short topic (a few words naming the subject) and a one-sentence summary.

Allowed intents: {intents}
Allowed urgencies: {urgencies}

Respond with JSON only."#
    )
}

/// JSON schema for the classifier's structured output.
pub fn classification_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "intent": {
                "type": "string",
                "enum": Intent::ALL.iter().map(|i| i.as_str()).collect::<Vec<_>>()
            },
            "urgency": {
                "type": "string",
                "enum": Urgency::ALL.iter().map(|u| u.as_str()).collect::<Vec<_>>()
            },
            "topic": { "type": "string" },
            "summary": { "type": "string" }
        },
        "required": ["intent", "urgency", "topic", "summary"],
        "additionalProperties": false
    })
}

// ============================================================================
// Retrieval
// ============================================================================

/// Prompt asking for `count` alternative phrasings of a search query.
pub fn query_expansion_prompt(query: &str, count: usize) -> String {
    format!(
        "You are an AI language model assistant. Your task is to generate {count} different \
         versions of the given user question to retrieve relevant documents from a vector \
         database. By generating multiple perspectives on the user question, your goal is to \
         help the user overcome some of the limitations of distance-based similarity search. \
         Provide these alternative questions separated by newlines, with no numbering.\n\
         Original question: {query}"
    )
}
