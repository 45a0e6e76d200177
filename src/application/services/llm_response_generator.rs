//! Reply generation over the persona prompt, the grounding instruction and
//! the running conversation.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::conversation::{ConversationHistory, Role};
use crate::domain::knowledge::Grounding;
use crate::domain::orchestrator::prompts::{
    grounding_instruction, makes_commitment, mentions_unavailability, safe_fallback_reply,
    system_prompt, DEFAULT_CONTACT_CHANNEL, DEFAULT_ORGANIZATION,
};
use crate::domain::orchestrator::{GeneratedReply, GenerationError, ResponseGenerator};
use crate::ports::{ChatMessage, CompletionRequest, LanguageModel};

pub const DEFAULT_MAX_REPLY_TOKENS: u32 = 300;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub organization: String,
    pub contact_channel: String,
    pub max_reply_tokens: u32,
    pub temperature: f32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            contact_channel: DEFAULT_CONTACT_CHANNEL.to_string(),
            max_reply_tokens: DEFAULT_MAX_REPLY_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

pub struct LlmResponseGenerator {
    model: Arc<dyn LanguageModel>,
    settings: GeneratorSettings,
}

impl LlmResponseGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, settings: GeneratorSettings) -> Self {
        Self { model, settings }
    }

    /// Persona, then grounding, then the conversation so far.
    fn build_messages(&self, history: &ConversationHistory, grounding: &Grounding) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt(
            &self.settings.organization,
            &self.settings.contact_channel,
        )));
        messages.push(ChatMessage::system(grounding_instruction(
            grounding,
            &self.settings.contact_channel,
        )));
        messages.extend(history.messages().iter().map(|m| match m.role {
            Role::Human => ChatMessage::user(&m.content),
            Role::Assistant => ChatMessage::assistant(&m.content),
            Role::System => ChatMessage::system(&m.content),
        }));
        messages
    }
}

/// Whether an ungrounded reply must be replaced by the safe fallback.
///
/// After failed retrieval any reply that does not admit the gap is replaced.
/// Without retrieval, small talk passes but guarantees, timelines and prices
/// do not.
fn needs_fallback(grounding: &Grounding, reply: &str) -> bool {
    match grounding {
        Grounding::Passages { .. } => false,
        Grounding::Unavailable => !mentions_unavailability(reply),
        Grounding::NotRequested => makes_commitment(reply) && !mentions_unavailability(reply),
    }
}

fn grounding_label(grounding: &Grounding) -> &'static str {
    match grounding {
        Grounding::Passages { .. } => "passages",
        Grounding::Unavailable => "unavailable",
        Grounding::NotRequested => "not_requested",
    }
}

#[async_trait]
impl ResponseGenerator for LlmResponseGenerator {
    async fn generate(
        &self,
        history: &ConversationHistory,
        grounding: &Grounding,
    ) -> Result<GeneratedReply, GenerationError> {
        let request = CompletionRequest::new()
            .with_messages(self.build_messages(history, grounding))
            .with_max_tokens(self.settings.max_reply_tokens)
            .with_temperature(self.settings.temperature);

        let response = self
            .model
            .complete(request)
            .await
            .map_err(|e| GenerationError::Model(e.to_string()))?;

        let mut content = response.content.trim().to_string();
        if content.is_empty() {
            return Err(GenerationError::EmptyReply);
        }

        if needs_fallback(grounding, &content) {
            tracing::warn!(
                grounding = grounding_label(grounding),
                "ungrounded reply did not state unavailability, using safe fallback"
            );
            content = safe_fallback_reply(&self.settings.contact_channel);
        }

        Ok(GeneratedReply::new(content)
            .with_usage(response.usage.prompt_tokens, response.usage.completion_tokens))
    }
}
