//! Api-call logger - tracing events plus an optional JSONL file

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ApiCallStatus, Telemetry};

/// One line of the api-call log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCallRecord {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub status: ApiCallStatus,
    pub duration_ms: u64,
}

/// Default [`Telemetry`] implementation
pub struct ApiCallLogger {
    path: Option<PathBuf>,
    // Serializes appends so concurrent planners never interleave lines
    write_lock: Mutex<()>,
}

impl ApiCallLogger {
    /// Log through tracing only
    pub fn new() -> Self {
        Self {
            path: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Log through tracing and append JSON lines to `path`
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!(?path, "ApiCallLogger::with_file: called");
        Self {
            path: Some(path),
            write_lock: Mutex::new(()),
        }
    }

    fn append(&self, path: &Path, record: &ApiCallRecord) -> eyre::Result<()> {
        let _guard = self.write_lock.lock().map_err(|_| eyre::eyre!("api-call log lock poisoned"))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        Ok(())
    }
}

impl Default for ApiCallLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry for ApiCallLogger {
    fn record_api_call(&self, operation: &str, status: ApiCallStatus, duration: Duration) {
        let duration_ms = duration.as_millis() as u64;
        info!(%operation, %status, duration_ms, "API call");

        if let Some(path) = &self.path {
            let record = ApiCallRecord {
                timestamp: Utc::now(),
                operation: operation.to_string(),
                status,
                duration_ms,
            };
            if let Err(e) = self.append(path, &record) {
                warn!(?path, error = %e, "Failed to append api-call record");
            }
        }
    }
}

/// Read every record from an api-call log; unreadable lines are skipped
pub fn read_api_calls(path: impl AsRef<Path>) -> eyre::Result<Vec<ApiCallRecord>> {
    let path = path.as_ref();
    debug!(?path, "read_api_calls: called");
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let records = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "read_api_calls: skipping malformed line");
                None
            }
        })
        .collect();
    Ok(records)
}
