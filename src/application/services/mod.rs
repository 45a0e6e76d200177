//! Application services - LLM-backed implementations of the orchestrator's
//! domain services.

mod llm_intent_classifier;
mod llm_response_generator;
mod multi_query_retriever;

pub use llm_intent_classifier::LlmIntentClassifier;
pub use llm_response_generator::{
    GeneratorSettings, LlmResponseGenerator, DEFAULT_MAX_REPLY_TOKENS, DEFAULT_TEMPERATURE,
};
pub use multi_query_retriever::{
    MultiQueryRetriever, RetrieverSettings, DEFAULT_EXPANSION_QUERIES, DEFAULT_FETCH_K, DEFAULT_K,
    DEFAULT_LAMBDA,
};
