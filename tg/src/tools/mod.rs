//! Search tools the planner binds to the chat model
//!
//! The tool set is closed: [`ToolKind`] names every tool the model may call
//! and the [`ToolExecutor`] dispatches on that tag.

mod error;
mod executor;
mod traits;

pub mod builtin;

pub use error::ToolError;
pub use executor::ToolExecutor;
pub use traits::{Tool, ToolResult};

use serde::{Deserialize, Serialize};

/// The closed set of tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Tavily web search, the primary source of current information
    TavilySearch,
    /// DuckDuckGo instant answers, keyless fallback
    DuckDuckGoSearch,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::TavilySearch, ToolKind::DuckDuckGoSearch];

    /// Name the model uses to call the tool
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::TavilySearch => "tavily_search_results_json",
            ToolKind::DuckDuckGoSearch => "duckduckgo_search",
        }
    }

    /// Resolve a model-supplied tool name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Truncate to at most `max_chars` characters, marking the cut with "..."
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
