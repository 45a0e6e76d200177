//! Conversation command handlers.
//!
//! Runs turns through the orchestration graph, one at a time per
//! conversation.

mod conversation_locks;
mod run_turn;

pub use conversation_locks::ConversationLocks;
pub use run_turn::{
    // Command
    RunTurnCommand,
    // Handler
    ConversationOrchestrator,
    OrchestratorSettings,
    // Results
    TurnEvent,
    TurnFailure,
    TurnOutcome,
    DEFAULT_STAGE_TIMEOUT,
};
