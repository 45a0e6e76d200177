//! Orchestrator Domain Module
//!
//! The turn-processing graph at the heart of the assistant. A turn walks
//! `read_message → intent_classifier → router → {rag_executor | general_message}`
//! and always ends in exactly one `general_message` reply.
//!
//! # Architecture
//!
//! - **Node**: the graph's vertices and their successor rules
//! - **TurnState**: the record threaded through one turn, guarding its invariants
//! - **Domain Services**: intent classification, retrieval and response
//!   generation, implemented by the application layer
//! - **Prompts**: the assistant persona and grounding instructions
//!
//! Pure domain logic. The executor that drives the graph against real
//! services lives in `application::handlers::conversation`.

pub mod errors;
pub mod graph;
pub mod prompts;
pub mod services;
pub mod turn_state;

pub use errors::*;
pub use graph::*;
pub use services::*;
pub use turn_state::*;
