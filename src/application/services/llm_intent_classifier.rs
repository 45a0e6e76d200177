//! Intent classification backed by a structured language-model call.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::orchestrator::prompts::{classification_prompt, classification_schema};
use crate::domain::orchestrator::{ClassificationError, IntentClassifier};
use crate::domain::routing::{Classification, Intent, Urgency};
use crate::ports::{invoke_structured, ChatMessage, CompletionRequest, LanguageModel, LlmError};

const SCHEMA_NAME: &str = "route_query";
const MAX_CLASSIFIER_TOKENS: u32 = 200;

/// Raw model output before it is forced into the closed label sets.
#[derive(Debug, Deserialize)]
struct RawClassification {
    intent: String,
    #[serde(default)]
    urgency: String,
    #[serde(default)]
    topic: String,
    #[serde(default)]
    summary: String,
}

pub struct LlmIntentClassifier {
    model: Arc<dyn LanguageModel>,
}

impl LlmIntentClassifier {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    fn request(message: &str) -> CompletionRequest {
        CompletionRequest::new()
            .with_messages([
                ChatMessage::system(classification_prompt()),
                ChatMessage::user(message),
            ])
            .with_temperature(0.0)
            .with_max_tokens(MAX_CLASSIFIER_TOKENS)
            .with_json_schema(SCHEMA_NAME, classification_schema())
    }

    /// Forces raw labels into the closed sets. Unknown intents become
    /// `general_chat` and unknown urgencies `low`; both are logged.
    fn normalize(raw: RawClassification, message: &str) -> Classification {
        let intent = raw.intent.parse::<Intent>().unwrap_or_else(|err| {
            tracing::warn!(label = %raw.intent, error = %err, "classifier returned unknown intent, using general_chat");
            Intent::GeneralChat
        });
        let urgency = raw.urgency.parse::<Urgency>().unwrap_or_else(|_| {
            if !raw.urgency.trim().is_empty() {
                tracing::debug!(label = %raw.urgency, "unknown urgency, using low");
            }
            Urgency::Low
        });

        let fallback = Classification::fallback(message);
        let topic = if raw.topic.trim().is_empty() {
            fallback.topic
        } else {
            raw.topic.trim().to_string()
        };
        let summary = if raw.summary.trim().is_empty() {
            fallback.summary
        } else {
            raw.summary.trim().to_string()
        };

        Classification::new(intent, urgency, topic, summary)
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, message: &str) -> Result<Classification, ClassificationError> {
        let (raw, usage) =
            invoke_structured::<RawClassification>(self.model.as_ref(), Self::request(message))
                .await
                .map_err(|err| match err {
                    LlmError::Parse(detail) => {
                        ClassificationError::InvalidOutput(detail)
                    }
                    other => ClassificationError::Model(other.to_string()),
                })?;

        let classification = Self::normalize(raw, message);
        tracing::debug!(
            intent = %classification.intent,
            urgency = %classification.urgency,
            tokens = usage.total_tokens,
            "message classified"
        );
        Ok(classification)
    }
}
