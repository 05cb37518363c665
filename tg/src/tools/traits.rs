//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{ToolError, ToolKind};

/// A search tool the chat model can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which member of the closed tool set this is
    fn kind(&self) -> ToolKind;

    /// Tool name as the model sees it
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool; failures come back as an error result, never a panic
    async fn execute(&self, input: Value) -> ToolResult;
}

/// Result of a tool execution
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(content: impl Into<String>) -> Self {
        debug!("ToolResult::success: called");
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error result
    pub fn error(content: impl Into<String>) -> Self {
        debug!("ToolResult::error: called");
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

impl From<Result<String, ToolError>> for ToolResult {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(content) => Self::success(content),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Pull the required `query` string out of a tool input
pub(crate) fn required_query(input: &Value) -> Result<&str, ToolError> {
    input["query"]
        .as_str()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ToolError::InvalidArgument("query is required".to_string()))
}

/// Schema shared by the search tools: a single required query string
pub(crate) fn query_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Search query"
            }
        },
        "required": ["query"]
    })
}
