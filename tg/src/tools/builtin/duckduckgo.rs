//! duckduckgo_search - keyless fallback through the DuckDuckGo instant-answer API

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::http_client;
use crate::config::SearchConfig;
use crate::tools::traits::{query_schema, required_query};
use crate::tools::{Tool, ToolError, ToolKind, ToolResult, truncate};

const SNIPPET_CHARS: usize = 300;

/// Instant answers and related topics from DuckDuckGo
pub struct DuckDuckGoSearchTool {
    http: reqwest::Client,
    url: String,
    max_results: usize,
}

impl DuckDuckGoSearchTool {
    pub fn new(config: &SearchConfig) -> Result<Self, ToolError> {
        debug!("DuckDuckGoSearchTool::new: called");
        Ok(Self {
            http: http_client(Duration::from_millis(config.request_timeout_ms))?,
            url: config.ddg_url.clone(),
            max_results: config.ddg_max_results,
        })
    }

    async fn search(&self, query: &str) -> Result<String, ToolError> {
        debug!(%query, "DuckDuckGoSearchTool::search: called");
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                provider: "DuckDuckGo",
                status,
                message,
            });
        }

        let result: Value = response.json().await?;
        Ok(format_answer(&result, self.max_results))
    }
}

/// Abstract (when present) followed by related topic snippets
fn format_answer(result: &Value, max_results: usize) -> String {
    let mut sections = Vec::new();

    if let Some(text) = result["AbstractText"].as_str().filter(|t| !t.is_empty()) {
        let heading = result["Heading"].as_str().unwrap_or("Summary");
        let source = result["AbstractURL"].as_str().unwrap_or("");
        sections.push(format!("{}\n   {}\n   {}\n", heading, source, truncate(text, SNIPPET_CHARS)));
    }

    // Grouped topics nest their entries one level down under "Topics"
    let topics = result["RelatedTopics"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|item| match item["Topics"].as_array() {
            Some(group) => group.iter().collect::<Vec<_>>(),
            None => vec![item],
        })
        .filter_map(|item| Some((item["Text"].as_str()?, item["FirstURL"].as_str().unwrap_or(""))))
        .take(max_results);

    for (i, (text, url)) in topics.enumerate() {
        sections.push(format!("{}. {}\n   {}\n", i + 1, truncate(text, SNIPPET_CHARS), url));
    }

    if sections.is_empty() {
        "No results found".to_string()
    } else {
        sections.join("\n")
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::DuckDuckGoSearch
    }

    fn description(&self) -> &'static str {
        "A wrapper around DuckDuckGo Search. Useful for general facts about places, \
         attractions and local customs. Input should be a search query."
    }

    fn input_schema(&self) -> Value {
        query_schema()
    }

    async fn execute(&self, input: Value) -> ToolResult {
        debug!(?input, "DuckDuckGoSearchTool::execute: called");
        let outcome = match required_query(&input) {
            Ok(query) => self.search(query).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            warn!(error = %e, "DuckDuckGoSearchTool::execute: search failed");
        }
        outcome.into()
    }
}
