//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the chat model
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Client configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Transient failures the client retries on its own
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => *status == 408 || *status >= 500,
            LlmError::Network(_) => true,
            LlmError::InvalidResponse(_) | LlmError::Config(_) | LlmError::Json(_) => false,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(
            LlmError::RateLimited {
                retry_after: Duration::from_secs(5)
            }
            .is_retryable()
        );
        assert!(
            LlmError::ApiError {
                status: 503,
                message: "over capacity".to_string()
            }
            .is_retryable()
        );
        assert!(
            LlmError::ApiError {
                status: 408,
                message: "timeout".to_string()
            }
            .is_retryable()
        );

        // 4xx other than 408 means the request itself is wrong
        assert!(
            !LlmError::ApiError {
                status: 401,
                message: "Invalid API Key".to_string()
            }
            .is_retryable()
        );
        assert!(!LlmError::Config("GROQ_API_KEY not set".to_string()).is_retryable());
        assert!(!LlmError::InvalidResponse("no choices".to_string()).is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(7),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(LlmError::Config("x".to_string()).retry_after(), None);
    }

    #[test]
    fn test_display_includes_status() {
        let err = LlmError::ApiError {
            status: 400,
            message: "tool_use_failed".to_string(),
        };
        assert_eq!(err.to_string(), "API error 400: tool_use_failed");
    }
}
