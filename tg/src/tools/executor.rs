//! ToolExecutor - dispatches model tool calls onto the registered tools

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::llm::{ToolCall, ToolDefinition};

use super::builtin::{DuckDuckGoSearchTool, TavilySearchTool};
use super::{Tool, ToolError, ToolKind, ToolResult};

/// Registered tools keyed by their tag
pub struct ToolExecutor {
    tools: BTreeMap<ToolKind, Box<dyn Tool>>,
}

impl ToolExecutor {
    /// Create the executor for the configured search tools
    ///
    /// Tavily is always registered; DuckDuckGo joins it when the fallback is
    /// enabled.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ToolError> {
        debug!(enable_ddg_fallback = %config.enable_ddg_fallback, "ToolExecutor::from_config: called");
        let mut executor = Self::empty();
        executor.add_tool(Box::new(TavilySearchTool::new(config)?));
        if config.enable_ddg_fallback {
            executor.add_tool(Box::new(DuckDuckGoSearchTool::new(config)?));
        }
        info!(tools = ?executor.tool_names(), "ToolExecutor::from_config: tools registered");
        Ok(executor)
    }

    /// Create an empty executor
    pub fn empty() -> Self {
        debug!("ToolExecutor::empty: called");
        Self { tools: BTreeMap::new() }
    }

    /// Add a tool, replacing any tool of the same kind
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        debug!(tool_name = %tool.name(), "ToolExecutor::add_tool: called");
        self.tools.insert(tool.kind(), tool);
    }

    /// Get tool definitions for the LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        debug!("ToolExecutor::definitions: called");
        self.tools
            .values()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect()
    }

    /// Execute a tool call
    ///
    /// Names outside the closed set, and kinds that were not registered, come
    /// back as error results.
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        debug!(tool_name = %tool_call.name, tool_id = %tool_call.id, "ToolExecutor::execute: called");
        let Some(kind) = ToolKind::from_name(&tool_call.name) else {
            debug!("ToolExecutor::execute: unknown tool");
            return ToolResult::error(format!("Unknown tool: {}", tool_call.name));
        };

        match self.tools.get(&kind) {
            Some(tool) => tool.execute(tool_call.input.clone()).await,
            None => {
                debug!(%kind, "ToolExecutor::execute: tool not registered");
                ToolResult::error(format!("Tool not available: {}", kind))
            }
        }
    }

    /// Names of the registered tools
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.keys().map(|k| k.name()).collect()
    }
}
