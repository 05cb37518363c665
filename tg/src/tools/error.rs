//! Tool error types

use thiserror::Error;

/// Errors raised inside a search tool
///
/// These never cross the tool boundary: the executor turns them into an
/// error [`ToolResult`](super::ToolResult) for the model to read.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{env} is not set; search is unavailable")]
    MissingApiKey { env: String },

    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },
}
