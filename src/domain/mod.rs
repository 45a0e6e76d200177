//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, validation errors)
//! - `conversation` - Role-tagged messages and the append-only history
//! - `routing` - The closed intent set and its mapping onto routes
//! - `knowledge` - Passages, flat metadata, similarity and grounding
//! - `orchestrator` - The turn graph, its state and the services it calls
//! - `ingestion` - Portfolio records, text splitting and the master taxonomy

pub mod conversation;
pub mod foundation;
pub mod ingestion;
pub mod knowledge;
pub mod orchestrator;
pub mod routing;
