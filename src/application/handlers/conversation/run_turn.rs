//! RunTurn command handler.
//!
//! Drives one conversational turn through the graph
//! `read_message → intent_classifier → router → {rag_executor | general_message}`,
//! bracketed by a checkpoint load and a checkpoint save. Turns on the same
//! conversation are serialized; different conversations run concurrently.
//!
//! External calls never fail a turn. A classifier, retriever or generator
//! error (or a stage timeout) takes that stage's degraded path. Only
//! checkpoint failures and graph invariant violations surface as
//! [`TurnFailure`].

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

use super::conversation_locks::ConversationLocks;
use crate::domain::conversation::{ConversationHistory, Message};
use crate::domain::foundation::ConversationId;
use crate::domain::knowledge::{Grounding, Passage, DEFAULT_GROUNDING_LIMIT};
use crate::domain::orchestrator::prompts::{generation_error_reply, DEFAULT_CONTACT_CHANNEL};
use crate::domain::orchestrator::{
    IntentClassifier, Node, ResponseGenerator, Retriever, TurnError, TurnState, DEFAULT_GREETING,
};
use crate::domain::routing::{Classification, Route};
use crate::ports::{CheckpointError, CheckpointStore, TokenUsage};

pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Command to run one turn.
#[derive(Debug, Clone)]
pub struct RunTurnCommand {
    pub conversation_id: ConversationId,
    /// The new human message. Blank means "no new message".
    pub message: String,
}

impl RunTurnCommand {
    pub fn new(conversation_id: ConversationId, message: impl Into<String>) -> Self {
        Self {
            conversation_id,
            message: message.into(),
        }
    }
}

/// Progress notifications emitted while a turn runs, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    NodeStarted { node: Node },
    PassagesRetrieved { count: usize },
    ReplyGenerated { content: String, usage: TokenUsage },
}

/// Result of a completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub conversation_id: ConversationId,
    pub reply: String,
    pub classification: Classification,
    pub route: Route,
    /// Passages folded into the grounding block.
    pub passages_used: usize,
    /// Token usage of the reply generation.
    pub usage: TokenUsage,
    pub visited: Vec<Node>,
}

/// Failures that abort a turn.
#[derive(Debug, Error)]
pub enum TurnFailure {
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("turn invariant violated: {0}")]
    Invariant(#[from] TurnError),
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub stage_timeout: Duration,
    pub grounding_limit: usize,
    pub contact_channel: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            grounding_limit: DEFAULT_GROUNDING_LIMIT,
            contact_channel: DEFAULT_CONTACT_CHANNEL.to_string(),
        }
    }
}

/// Handler for RunTurn commands.
#[derive(Clone)]
pub struct ConversationOrchestrator {
    classifier: Arc<dyn IntentClassifier>,
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn ResponseGenerator>,
    checkpoints: Arc<dyn CheckpointStore>,
    locks: ConversationLocks,
    settings: OrchestratorSettings,
}

impl ConversationOrchestrator {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn ResponseGenerator>,
        checkpoints: Arc<dyn CheckpointStore>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            classifier,
            retriever,
            generator,
            checkpoints,
            locks: ConversationLocks::new(),
            settings,
        }
    }

    /// Runs a turn, optionally reporting progress on `events`.
    ///
    /// A closed event channel is ignored; the turn still completes and
    /// persists.
    #[tracing::instrument(skip_all, fields(conversation_id = %command.conversation_id))]
    pub async fn handle(
        &self,
        command: RunTurnCommand,
        events: Option<mpsc::UnboundedSender<TurnEvent>>,
    ) -> Result<TurnOutcome, TurnFailure> {
        let RunTurnCommand {
            conversation_id,
            message,
        } = command;

        let lock = self.locks.lock_for(&conversation_id);
        let _guard = lock.lock().await;

        let mut history = self.load_history(&conversation_id).await?;
        let message = message.trim();
        if !message.is_empty() {
            history.append(Message::human(message));
        }

        let emit = |event: TurnEvent| {
            if let Some(tx) = &events {
                let _ = tx.send(event);
            }
        };

        let mut state = TurnState::new(history);
        let mut usage = TokenUsage::zero();
        let mut passages_used = 0;
        let mut node = Node::START;

        while node != Node::End {
            state.mark_visited(node);
            emit(TurnEvent::NodeStarted { node });

            match node {
                Node::ReadMessage => {
                    state.read_message();
                    tracing::debug!(
                        turn_messages = state.current_turn_messages().len(),
                        history_len = state.message_history().len(),
                        "message read"
                    );
                }
                Node::IntentClassifier => {
                    let text = state.user_message().unwrap_or(DEFAULT_GREETING).to_string();
                    let classification = self.classify(&text).await;
                    state.record_classification(classification)?;
                }
                Node::Router => {
                    if let (Some(classification), Some(route)) =
                        (state.classification(), state.route())
                    {
                        tracing::info!(
                            intent = %classification.intent,
                            urgency = %classification.urgency,
                            route = %route,
                            "routing decision"
                        );
                    }
                }
                Node::RagExecutor => {
                    let query = state
                        .classification()
                        .map(Classification::search_query)
                        .unwrap_or_default();
                    let passages = self.retrieve(&query).await;
                    emit(TurnEvent::PassagesRetrieved {
                        count: passages.len(),
                    });
                    state.record_passages(passages)?;
                }
                Node::GeneralMessage => {
                    let grounding = Grounding::from_passages(
                        state.retrieved_passages(),
                        self.settings.grounding_limit,
                        state.retrieval_attempted(),
                    );
                    passages_used = grounding.passage_count();
                    let (reply, reply_usage) =
                        self.generate(state.message_history(), &grounding).await;
                    usage = reply_usage;
                    state.record_reply(reply.clone())?;
                    emit(TurnEvent::ReplyGenerated {
                        content: reply,
                        usage,
                    });
                }
                Node::End => {}
            }

            node = node.successor(&state)?;
        }

        let classification = state
            .classification()
            .cloned()
            .ok_or(TurnError::MissingState {
                node: "end",
                missing: "a classification",
            })?;
        let route = classification.route();
        let reply = state
            .final_response()
            .map(str::to_string)
            .ok_or(TurnError::MissingState {
                node: "end",
                missing: "a generated reply",
            })?;
        let visited = state.visited().to_vec();

        let history = state.into_history();
        self.checkpoints.save(&conversation_id, &history).await?;

        tracing::info!(
            intent = %classification.intent,
            route = %route,
            passages_used,
            total_tokens = usage.total_tokens,
            "turn completed"
        );

        Ok(TurnOutcome {
            conversation_id,
            reply,
            classification,
            route,
            passages_used,
            usage,
            visited,
        })
    }

    async fn load_history(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<ConversationHistory, TurnFailure> {
        match self.checkpoints.load(conversation_id).await {
            Ok(history) => Ok(history),
            Err(CheckpointError::NotFound(_)) => Ok(ConversationHistory::new()),
            Err(err) => {
                tracing::error!(error = %err, "failed to load checkpoint");
                Err(err.into())
            }
        }
    }

    async fn classify(&self, message: &str) -> Classification {
        match self.staged("intent_classifier", self.classifier.classify(message)).await {
            Some(Ok(classification)) => classification,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "intent classification failed, falling back to general_chat");
                Classification::fallback(message)
            }
            None => Classification::fallback(message),
        }
    }

    async fn retrieve(&self, query: &str) -> Vec<Passage> {
        match self.staged("rag_executor", self.retriever.retrieve(query)).await {
            Some(Ok(passages)) => passages,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "retrieval failed, continuing without passages");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    async fn generate(
        &self,
        history: &ConversationHistory,
        grounding: &Grounding,
    ) -> (String, TokenUsage) {
        match self
            .staged("general_message", self.generator.generate(history, grounding))
            .await
        {
            Some(Ok(reply)) => {
                let usage = TokenUsage::new(reply.prompt_tokens, reply.completion_tokens);
                (reply.content, usage)
            }
            Some(Err(err)) => {
                tracing::error!(error = %err, "response generation failed");
                (generation_error_reply(&self.settings.contact_channel), TokenUsage::zero())
            }
            None => (generation_error_reply(&self.settings.contact_channel), TokenUsage::zero()),
        }
    }

    /// Runs a stage under the stage timeout; `None` means it timed out.
    async fn staged<T>(&self, stage: &'static str, fut: impl Future<Output = T>) -> Option<T> {
        match tokio::time::timeout(self.settings.stage_timeout, fut).await {
            Ok(output) => Some(output),
            Err(_) => {
                tracing::warn!(
                    stage,
                    timeout_ms = self.settings.stage_timeout.as_millis() as u64,
                    "stage timed out, taking degraded path"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryCheckpointStore;
    use crate::domain::knowledge::PassageMetadata;
    use crate::domain::orchestrator::{
        ClassificationError, GeneratedReply, GenerationError, KeywordIntentClassifier,
        RetrievalError,
    };
    use crate::domain::routing::{Intent, Urgency};
    use async_trait::async_trait;

    struct FixedRetriever(Vec<Passage>);

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<Passage>, RetrievalError> {
            Ok(self.0.clone())
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl IntentClassifier for FailingClassifier {
        async fn classify(&self, _message: &str) -> Result<Classification, ClassificationError> {
            Err(ClassificationError::Model("down".into()))
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl ResponseGenerator for EchoGenerator {
        async fn generate(
            &self,
            _history: &ConversationHistory,
            grounding: &Grounding,
        ) -> Result<GeneratedReply, GenerationError> {
            Ok(GeneratedReply::new(format!("grounded on {}", grounding.passage_count()))
                .with_usage(5, 7))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl ResponseGenerator for FailingGenerator {
        async fn generate(
            &self,
            _history: &ConversationHistory,
            _grounding: &Grounding,
        ) -> Result<GeneratedReply, GenerationError> {
            Err(GenerationError::Model("503".into()))
        }
    }

    fn passage(content: &str) -> Passage {
        Passage::derived("t", content, PassageMetadata::new().with("category", "Capability"))
    }

    fn orchestrator(
        classifier: Arc<dyn IntentClassifier>,
        generator: Arc<dyn ResponseGenerator>,
    ) -> ConversationOrchestrator {
        ConversationOrchestrator::new(
            classifier,
            Arc::new(FixedRetriever(vec![passage("React dashboards")])),
            generator,
            Arc::new(InMemoryCheckpointStore::new()),
            OrchestratorSettings::default(),
        )
    }

    fn command(message: &str) -> RunTurnCommand {
        RunTurnCommand::new(ConversationId::new("t-1").unwrap(), message)
    }

    #[tokio::test]
    async fn greeting_skips_retrieval() {
        let o = orchestrator(Arc::new(KeywordIntentClassifier), Arc::new(EchoGenerator));
        let outcome = o.handle(command("Hi"), None).await.unwrap();

        assert_eq!(outcome.route, Route::GeneralMessage);
        assert_eq!(
            outcome.visited,
            vec![Node::ReadMessage, Node::IntentClassifier, Node::Router, Node::GeneralMessage]
        );
        assert_eq!(outcome.reply, "grounded on 0");
    }

    #[tokio::test]
    async fn knowledge_question_retrieves_then_replies() {
        let o = orchestrator(Arc::new(KeywordIntentClassifier), Arc::new(EchoGenerator));
        let outcome = o.handle(command("Do you have React experience?"), None).await.unwrap();

        assert_eq!(outcome.classification.intent, Intent::KnowledgeSearch);
        assert!(outcome.visited.contains(&Node::RagExecutor));
        assert_eq!(outcome.passages_used, 1);
        assert_eq!(outcome.usage.total_tokens, 12);
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let o = orchestrator(Arc::new(KeywordIntentClassifier), Arc::new(EchoGenerator));
        let (tx, mut rx) = mpsc::unbounded_channel();
        o.handle(command("Do you build dashboards?"), Some(tx)).await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events[0], TurnEvent::NodeStarted { node: Node::ReadMessage });
        assert!(events.contains(&TurnEvent::PassagesRetrieved { count: 1 }));
        assert!(matches!(events.last(), Some(TurnEvent::ReplyGenerated { .. })));
    }

    #[tokio::test]
    async fn classifier_failure_degrades_to_general_chat() {
        let o = orchestrator(Arc::new(FailingClassifier), Arc::new(EchoGenerator));
        let outcome = o.handle(command("Do you do Vue?"), None).await.unwrap();

        assert_eq!(outcome.classification.intent, Intent::GeneralChat);
        assert_eq!(outcome.classification.urgency, Urgency::Low);
        assert!(!outcome.visited.contains(&Node::RagExecutor));
    }

    #[tokio::test]
    async fn generator_failure_yields_polite_reply() {
        let o = orchestrator(Arc::new(KeywordIntentClassifier), Arc::new(FailingGenerator));
        let outcome = o.handle(command("Hello"), None).await.unwrap();

        assert_eq!(outcome.reply, generation_error_reply(DEFAULT_CONTACT_CHANNEL));
        assert_eq!(outcome.usage, TokenUsage::zero());
    }

    #[tokio::test]
    async fn blank_first_message_becomes_greeting() {
        let store = Arc::new(InMemoryCheckpointStore::new());
        let o = ConversationOrchestrator::new(
            Arc::new(KeywordIntentClassifier),
            Arc::new(FixedRetriever(Vec::new())),
            Arc::new(EchoGenerator),
            store.clone(),
            OrchestratorSettings::default(),
        );
        o.handle(command("   "), None).await.unwrap();

        let saved = store.load(&ConversationId::new("t-1").unwrap()).await.unwrap();
        assert_eq!(saved.messages()[0].content, DEFAULT_GREETING);
        assert_eq!(saved.len(), 2);
    }
}
