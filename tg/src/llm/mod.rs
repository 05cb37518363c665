//! Chat model access for TripGenie
//!
//! Provides the [`LlmClient`] seam, the conversation types and the
//! OpenAI-compatible HTTP client used for Groq and OpenAI.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod openai;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{
    ChatMessage, CompletionRequest, CompletionResponse, Role, StopReason, TokenUsage, ToolCall, ToolDefinition,
};

use crate::config::LlmConfig;

/// Providers reachable through the OpenAI-compatible client
pub const SUPPORTED_PROVIDERS: &[&str] = &["groq", "openai"];

/// Create an LLM client for the configured provider
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "groq" | "openai" => Ok(Arc::new(OpenAIClient::from_config(config)?)),
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::Config(format!(
                "Unknown LLM provider: '{}'. Supported: {}",
                other,
                SUPPORTED_PROVIDERS.join(", ")
            )))
        }
    }
}
