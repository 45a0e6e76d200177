//! Language Model Adapters.
//!
//! ## Available Adapters
//!
//! - `MockLanguageModel` - Configurable mock for testing and offline runs
//! - `OpenAIProvider` - OpenAI chat completions

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockError, MockHandler, MockLanguageModel, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
