//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Chat model client
///
/// Each call carries the whole conversation; the client keeps no state
/// between calls. Implementations retry transient failures internally, so an
/// `Err` returned here is final for that model turn.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one completion request and wait for the full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tracing::debug;

    /// Scripted LLM client for unit tests
    ///
    /// Replays the queued outcomes in order and records every request it was
    /// sent. Once the script is exhausted every call fails.
    pub struct MockLlmClient {
        script: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<CompletionResponse>) -> Self {
            debug!(response_count = %responses.len(), "MockLlmClient::new: called");
            Self::scripted(responses.into_iter().map(Ok).collect())
        }

        pub fn scripted(script: Vec<Result<CompletionResponse, LlmError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// A client whose every call fails
        pub fn failing() -> Self {
            Self::scripted(vec![])
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!(message_count = %request.messages.len(), "MockLlmClient::complete: called");
            self.requests.lock().unwrap().push(request);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::InvalidResponse("No more mock responses".to_string())))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::llm::ChatMessage;

        fn request() -> CompletionRequest {
            CompletionRequest {
                messages: vec![ChatMessage::user("Plan a trip")],
                tools: vec![],
                max_tokens: None,
            }
        }

        #[tokio::test]
        async fn test_mock_client_replays_script() {
            let client = MockLlmClient::new(vec![
                CompletionResponse::text("Response 1"),
                CompletionResponse::text("Response 2"),
            ]);

            let first = client.complete(request()).await.unwrap();
            assert_eq!(first.content.as_deref(), Some("Response 1"));

            let second = client.complete(request()).await.unwrap();
            assert_eq!(second.content.as_deref(), Some("Response 2"));

            assert_eq!(client.call_count(), 2);
            assert_eq!(client.requests()[0].messages.len(), 1);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::failing();
            assert!(client.complete(request()).await.is_err());
            assert_eq!(client.call_count(), 1);
        }
    }
}
