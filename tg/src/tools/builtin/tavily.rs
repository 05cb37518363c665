//! tavily_search_results_json - web search through the Tavily API

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::http_client;
use crate::config::SearchConfig;
use crate::tools::traits::{query_schema, required_query};
use crate::tools::{Tool, ToolError, ToolKind, ToolResult, truncate};

/// Snippet length per result
const SNIPPET_CHARS: usize = 300;

/// Search the web for current travel information
pub struct TavilySearchTool {
    http: reqwest::Client,
    url: String,
    api_key_env: String,
    api_key: Option<String>,
    max_results: usize,
}

impl TavilySearchTool {
    pub fn new(config: &SearchConfig) -> Result<Self, ToolError> {
        debug!(max_results = %config.tavily_max_results, "TavilySearchTool::new: called");
        let api_key = config.tavily_api_key();
        if api_key.is_none() {
            warn!(env = %config.tavily_api_key_env, "TavilySearchTool::new: no API key, searches will fail");
        }
        Ok(Self {
            http: http_client(Duration::from_millis(config.request_timeout_ms))?,
            url: config.tavily_url.clone(),
            api_key_env: config.tavily_api_key_env.clone(),
            api_key,
            max_results: config.tavily_max_results,
        })
    }

    async fn search(&self, query: &str) -> Result<String, ToolError> {
        debug!(%query, "TavilySearchTool::search: called");
        let api_key = self.api_key.as_deref().ok_or_else(|| ToolError::MissingApiKey {
            env: self.api_key_env.clone(),
        })?;

        let body = serde_json::json!({
            "api_key": api_key,
            "query": query,
            "max_results": self.max_results,
            "search_depth": "basic"
        });

        let response = self.http.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                provider: "Tavily",
                status,
                message,
            });
        }

        let result: Value = response.json().await?;
        Ok(format_results(&result))
    }
}

/// Numbered title / url / snippet listing of a Tavily response
fn format_results(result: &Value) -> String {
    let results = match result["results"].as_array() {
        Some(r) if !r.is_empty() => r,
        _ => return "No results found".to_string(),
    };

    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let title = r["title"].as_str().unwrap_or("(no title)");
            let url = r["url"].as_str().unwrap_or("");
            let content = r["content"].as_str().unwrap_or("");
            format!("{}. {}\n   {}\n   {}\n", i + 1, title, url, truncate(content, SNIPPET_CHARS))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::TavilySearch
    }

    fn description(&self) -> &'static str {
        "A search engine optimized for comprehensive, accurate, and trusted results. \
         Useful for current information about flights, trains, hotels, prices, weather and events. \
         Input should be a search query."
    }

    fn input_schema(&self) -> Value {
        query_schema()
    }

    async fn execute(&self, input: Value) -> ToolResult {
        debug!(?input, "TavilySearchTool::execute: called");
        let outcome = match required_query(&input) {
            Ok(query) => self.search(query).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            warn!(error = %e, "TavilySearchTool::execute: search failed");
        }
        outcome.into()
    }
}
