//! LLM integration.
//!
//! The chatbot needs exactly one shape of call: a chat completion with an
//! optional function manifest. `LlmProvider` is that seam; `OpenAiProvider`
//! carries it over the OpenAI chat-completions wire format.

pub mod openai;
pub mod provider;

pub use openai::OpenAiProvider;
pub use provider::*;

use std::sync::Arc;

use crate::config::ChatbotConfig;
use crate::error::LlmError;

/// Create the configured LLM provider.
pub fn create_provider(config: &ChatbotConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    tracing::info!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(OpenAiProvider::new(config)?))
}
