//! OpenAI-compatible chat completions client
//!
//! Works against any endpoint that speaks the `/v1/chat/completions`
//! function-calling dialect. Groq is the default provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ChatMessage, CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, TokenUsage, ToolCall};
use crate::config::LlmConfig;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Upper bound on a server-requested retry-after wait
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// OpenAI-compatible API client
pub struct OpenAIClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    temperature: f32,
    max_tokens: Option<u32>,
    max_retries: u32,
    initial_backoff: Duration,
}

impl OpenAIClient {
    /// Create a client from configuration, reading the API key from the
    /// configured environment variable
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(provider = %config.provider, model = %config.model, "OpenAIClient::from_config: called");
        let api_key = config.api_key().map_err(|e| LlmError::Config(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Build the request body for the chat completions endpoint
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, message_count = %request.messages.len(), "build_request_body: called");

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": convert_messages(&request.messages),
            "temperature": self.temperature,
        });

        let max_tokens = match (request.max_tokens, self.max_tokens) {
            (Some(req), Some(cap)) => Some(req.min(cap)),
            (req, cap) => req.or(cap),
        };
        if let Some(max_tokens) = max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            debug!("build_request_body: tools not empty, adding tools");
            body["tools"] = serde_json::json!(request.tools.iter().map(|t| t.to_openai_schema()).collect::<Vec<_>>());
            body["tool_choice"] = serde_json::json!("auto");
        }

        body
    }

    /// Parse the API response into a completion
    fn parse_response(&self, api_response: OpenAIResponse) -> Result<CompletionResponse, LlmError> {
        debug!(choice_count = %api_response.choices.len(), "parse_response: called");
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                let input = serde_json::from_str(&tc.function.arguments).unwrap_or_else(|e| {
                    warn!(tool = %tc.function.name, error = %e, "parse_response: unparseable tool arguments");
                    serde_json::json!({})
                });
                ToolCall::new(tc.id, tc.function.name, input)
            })
            .collect();

        let usage = api_response.usage.unwrap_or_default();
        Ok(CompletionResponse {
            content: choice.message.content.filter(|c| !c.is_empty()),
            tool_calls,
            stop_reason: StopReason::from_openai(choice.finish_reason.as_deref()),
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }

    /// One POST to the completions endpoint
    async fn attempt(&self, url: &str, body: &serde_json::Value) -> Result<CompletionResponse, LlmError> {
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1)
                .min(MAX_RETRY_AFTER_SECS);
            debug!(retry_after, "attempt: rate limited (429)");
            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            debug!(%status, "attempt: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        debug!("attempt: success");
        let text = response.text().await?;
        let api_response: OpenAIResponse = serde_json::from_str(&text)?;
        self.parse_response(api_response)
    }
}

/// Map the conversation onto OpenAI chat messages
fn convert_messages(messages: &[ChatMessage]) -> Vec<serde_json::Value> {
    debug!(message_count = %messages.len(), "convert_messages: called");
    messages
        .iter()
        .map(|msg| match msg {
            ChatMessage::System { content } => serde_json::json!({ "role": "system", "content": content }),
            ChatMessage::User { content } => serde_json::json!({ "role": "user", "content": content }),
            ChatMessage::Assistant { content, tool_calls } if tool_calls.is_empty() => {
                serde_json::json!({ "role": "assistant", "content": content.as_deref().unwrap_or_default() })
            }
            ChatMessage::Assistant { content, tool_calls } => {
                let calls: Vec<_> = tool_calls
                    .iter()
                    .map(|tc| {
                        serde_json::json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": tc.input.to_string(),
                            }
                        })
                    })
                    .collect();
                serde_json::json!({ "role": "assistant", "content": content, "tool_calls": calls })
            }
            ChatMessage::ToolResult { call_id, content, .. } => {
                serde_json::json!({ "role": "tool", "tool_call_id": call_id, "content": content })
            }
        })
        .collect()
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, "complete: called");
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let mut backoff = self.initial_backoff * 2u32.pow(attempt - 1);
                if let Some(wait) = last_error.as_ref().and_then(LlmError::retry_after) {
                    backoff = backoff.max(wait);
                }
                warn!(attempt, backoff_ms = backoff.as_millis() as u64, "complete: retrying after transient error");
                tokio::time::sleep(backoff).await;
            }

            let error = match self.attempt(&url, &body).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            if !error.is_retryable() {
                debug!(attempt, error = %error, "complete: non-retryable error");
                return Err(error);
            }
            debug!(attempt, error = %error, "complete: retryable error");
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| LlmError::InvalidResponse("Max retries exceeded".to_string())))
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ToolDefinition;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn client(max_tokens: Option<u32>) -> OpenAIClient {
        OpenAIClient {
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.groq.com/openai".to_string(),
            http: Client::new(),
            temperature: 0.4,
            max_tokens,
            max_retries: 2,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let request = CompletionRequest {
            messages: vec![ChatMessage::system("You are TripGenie"), ChatMessage::user("Hello")],
            tools: vec![],
            max_tokens: None,
        };

        let body = client(None).build_request_body(&request);

        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert!((body["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are TripGenie");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body.get("tools").is_none());
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_max_tokens_capped_by_config() {
        let request = CompletionRequest {
            messages: vec![],
            tools: vec![],
            max_tokens: Some(5000),
        };

        let body = client(Some(1000)).build_request_body(&request);
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_tools_are_bound() {
        let request = CompletionRequest {
            messages: vec![ChatMessage::user("weather in Goa")],
            tools: vec![ToolDefinition::new(
                "duckduckgo_search",
                "Search",
                serde_json::json!({"type": "object"}),
            )],
            max_tokens: None,
        };

        let body = client(None).build_request_body(&request);
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["function"]["name"], "duckduckgo_search");
    }

    #[test]
    fn test_convert_tool_exchange() {
        let call = ToolCall::new("call_1", "tavily_search_results_json", serde_json::json!({"query": "Goa hotels"}));
        let messages = vec![
            ChatMessage::assistant_with_tools(None, vec![call]),
            ChatMessage::tool_result("call_1", "tavily_search_results_json", "1. Taj", false),
        ];

        let converted = convert_messages(&messages);

        assert_eq!(converted[0]["role"], "assistant");
        assert!(converted[0]["content"].is_null());
        assert_eq!(converted[0]["tool_calls"][0]["id"], "call_1");
        assert_eq!(converted[0]["tool_calls"][0]["function"]["arguments"], r#"{"query":"Goa hotels"}"#);
        assert_eq!(converted[1]["role"], "tool");
        assert_eq!(converted[1]["tool_call_id"], "call_1");
        assert_eq!(converted[1]["content"], "1. Taj");
    }

    #[test]
    fn test_parse_response_with_tool_calls() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": { "name": "duckduckgo_search", "arguments": "{\"query\":\"Hampi\"}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 18 }
        });
        let api_response: OpenAIResponse = serde_json::from_value(raw).unwrap();

        let response = client(None).parse_response(api_response).unwrap();

        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].input["query"], "Hampi");
        assert_eq!(response.usage.input_tokens, 120);
    }

    #[test]
    fn test_parse_response_without_choices_fails() {
        let api_response: OpenAIResponse = serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();
        assert!(client(None).parse_response(api_response).is_err());
    }

    const STUB_SUCCESS: &str = r#"{"choices":[{"message":{"content":"Day 1: Baga Beach"},"finish_reason":"stop"}]}"#;

    /// Minimal HTTP endpoint answering each connection with the next scripted status
    async fn stub_endpoint(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            let mut statuses = statuses.into_iter();
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;

                let status = statuses.next().unwrap_or(500);
                let body = if status == 200 { STUB_SUCCESS } else { r#"{"error":"scripted"}"# };
                let extra = if status == 429 { "retry-after: 0\r\n" } else { "" };
                let response = format!(
                    "HTTP/1.1 {} Scripted\r\ncontent-type: application/json\r\ncontent-length: {}\r\n{}connection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    extra,
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), hits)
    }

    /// Consume headers and the declared body so the client sees a clean exchange
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn stub_client(base_url: String) -> OpenAIClient {
        OpenAIClient {
            base_url,
            initial_backoff: Duration::from_millis(5),
            ..client(None)
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::user("Plan Goa")],
            tools: vec![],
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn test_server_error_is_retried_then_succeeds() {
        let (url, hits) = stub_endpoint(vec![503, 200]).await;

        let response = stub_client(url).complete(request()).await.unwrap();

        assert_eq!(response.content.as_deref(), Some("Day 1: Baga Beach"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_stop_after_max_retries() {
        let (url, hits) = stub_endpoint(vec![503, 502, 500, 200]).await;

        let err = stub_client(url).complete(request()).await.unwrap_err();

        assert!(matches!(err, LlmError::ApiError { status: 500, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let (url, hits) = stub_endpoint(vec![429, 200]).await;

        let response = stub_client(url).complete(request()).await.unwrap();

        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let (url, hits) = stub_endpoint(vec![401, 200]).await;

        let err = stub_client(url).complete(request()).await.unwrap_err();

        assert!(matches!(err, LlmError::ApiError { status: 401, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
