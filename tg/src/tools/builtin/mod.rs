//! Built-in search tools

mod duckduckgo;
mod tavily;

pub use duckduckgo::DuckDuckGoSearchTool;
pub use tavily::TavilySearchTool;

use std::time::Duration;

use super::ToolError;

/// HTTP client shared by the search tools
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ToolError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}
