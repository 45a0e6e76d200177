//! Portfolio Concierge - Retrieval-Augmented Portfolio Assistant
//!
//! A conversational agent that answers visitor questions about a studio's
//! past work. Each message is classified into a closed intent set, routed
//! either through multi-query retrieval over indexed portfolio passages or
//! straight to reply generation, and answered with a reply grounded only in
//! what was retrieved.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
