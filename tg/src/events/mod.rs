//! Telemetry for outbound API work
//!
//! The planner reports each planning request through the [`Telemetry`]
//! trait. [`ApiCallLogger`] is the default collaborator: it emits a tracing
//! event and, when given a path, appends one JSON line per call.

mod logger;

pub use logger::{ApiCallLogger, ApiCallRecord, read_api_calls};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Outcome of a reported call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiCallStatus {
    Success,
    Failed,
}

impl fmt::Display for ApiCallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Receives one record per reported operation
pub trait Telemetry: Send + Sync {
    fn record_api_call(&self, operation: &str, status: ApiCallStatus, duration: Duration);
}
