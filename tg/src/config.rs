//! TripGenie configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::SUPPORTED_PROVIDERS;

/// Main TripGenie configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat model provider
    pub llm: LlmConfig,

    /// Search tools bound to the planner
    pub search: SearchConfig,

    /// Geocoding provider
    pub location: LocationConfig,

    /// Planner loop limits
    pub planner: PlannerConfig,

    /// Where trips and api-call records are written
    pub storage: StorageConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR); `--log-level` wins
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the provider is known and that both API key environment
    /// variables are set. Call this before any planning request so a missing
    /// key fails fast with a clear message.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(eyre::eyre!(
                "Unknown LLM provider '{}'. Supported: {}",
                self.llm.provider,
                SUPPORTED_PROVIDERS.join(", ")
            ));
        }
        self.llm.api_key()?;
        if self.search.tavily_api_key().is_none() {
            return Err(eyre::eyre!(
                "Search API key not found. Set the {} environment variable.",
                self.search.tavily_api_key_env
            ));
        }
        if self.planner.max_turns == 0 {
            return Err(eyre::eyre!("planner.max-turns must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .tripgenie.yml
        let local_config = PathBuf::from(".tripgenie.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/tripgenie/tripgenie.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tripgenie").join("tripgenie.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Chat model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("groq" or "openai"; both speak the OpenAI dialect)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL (without the /v1 suffix)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Optional cap on tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: Option<u32>,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Retries for transient failures (network, 408, 429, 5xx)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.api_key_env
            )),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            base_url: "https://api.groq.com/openai".to_string(),
            temperature: 0.4,
            max_tokens: None,
            timeout_ms: 120_000,
            max_retries: 2,
        }
    }
}

/// Search tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Environment variable containing the Tavily API key
    #[serde(rename = "tavily-api-key-env")]
    pub tavily_api_key_env: String,

    #[serde(rename = "tavily-url")]
    pub tavily_url: String,

    /// Results per Tavily search
    #[serde(rename = "tavily-max-results")]
    pub tavily_max_results: usize,

    /// Also bind the keyless DuckDuckGo tool
    #[serde(rename = "enable-ddg-fallback")]
    pub enable_ddg_fallback: bool,

    #[serde(rename = "ddg-url")]
    pub ddg_url: String,

    /// Related topics per DuckDuckGo search
    #[serde(rename = "ddg-max-results")]
    pub ddg_max_results: usize,

    /// Per-request timeout in milliseconds
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,
}

impl SearchConfig {
    /// Tavily key from the environment, if set and non-empty
    pub fn tavily_api_key(&self) -> Option<String> {
        std::env::var(&self.tavily_api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tavily_api_key_env: "TAVILY_API_KEY".to_string(),
            tavily_url: "https://api.tavily.com/search".to_string(),
            tavily_max_results: 3,
            enable_ddg_fallback: true,
            ddg_url: "https://api.duckduckgo.com/".to_string(),
            ddg_max_results: 3,
            request_timeout_ms: 30_000,
        }
    }
}

/// Geocoding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Nominatim search endpoint
    #[serde(rename = "nominatim-url")]
    pub nominatim_url: String,

    /// User-Agent header; Nominatim's usage policy requires one
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Minimum gap between the end of one request and the start of the next
    #[serde(rename = "rate-limit-delay-ms")]
    pub rate_limit_delay_ms: u64,

    /// Candidates requested per search
    #[serde(rename = "max-results")]
    pub max_results: usize,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: "TripGenie-Education-Project-v1.0".to_string(),
            rate_limit_delay_ms: 1000,
            max_results: 5,
            timeout_ms: 10_000,
        }
    }
}

/// Planner loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Model turns allowed per planning request
    #[serde(rename = "max-turns")]
    pub max_turns: u32,

    /// Optional cap on tokens per model turn
    #[serde(rename = "max-tokens")]
    pub max_tokens: Option<u32>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_turns: 8,
            max_tokens: None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Trip history JSON file
    #[serde(rename = "archive-path")]
    pub archive_path: PathBuf,

    /// Append api-call records here as JSON lines (disabled when unset)
    #[serde(rename = "api-call-log")]
    pub api_call_log: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            archive_path: triparchive::default_archive_path(),
            api_call_log: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
        // SAFETY: callers are #[serial], no other thread touches the environment
        unsafe {
            for (name, value) in vars {
                match value {
                    Some(v) => std::env::set_var(name, v),
                    None => std::env::remove_var(name),
                }
            }
        }
        let out = f();
        unsafe {
            for (name, _) in vars {
                std::env::remove_var(name);
            }
        }
        out
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert!((config.llm.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.llm.max_retries, 2);
        assert_eq!(config.search.tavily_max_results, 3);
        assert!(config.search.enable_ddg_fallback);
        assert_eq!(config.location.user_agent, "TripGenie-Education-Project-v1.0");
        assert_eq!(config.location.rate_limit_delay_ms, 1000);
        assert_eq!(config.planner.max_turns, 8);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: openai
  model: gpt-4o-mini
  api-key-env: MY_OPENAI_KEY
  base-url: https://api.openai.com
  temperature: 0.2
  max-retries: 4

search:
  tavily-max-results: 5
  enable-ddg-fallback: false

location:
  rate-limit-delay-ms: 1500

planner:
  max-turns: 12

storage:
  archive-path: /tmp/trips.json
  api-call-log: /tmp/api_calls.jsonl

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env, "MY_OPENAI_KEY");
        assert_eq!(config.llm.max_retries, 4);
        assert_eq!(config.search.tavily_max_results, 5);
        assert!(!config.search.enable_ddg_fallback);
        assert_eq!(config.location.rate_limit_delay_ms, 1500);
        assert_eq!(config.planner.max_turns, 12);
        assert_eq!(config.storage.archive_path, PathBuf::from("/tmp/trips.json"));
        assert_eq!(config.storage.api_call_log, Some(PathBuf::from("/tmp/api_calls.jsonl")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: llama-3.1-8b-instant
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.location.max_results, 5);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tripgenie.yml");
        fs::write(&path, "planner:\n  max-turns: 3\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.planner.max_turns, 3);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_validate_requires_llm_key() {
        let err = with_env(&[("GROQ_API_KEY", None), ("TAVILY_API_KEY", Some("tvly-test"))], || {
            Config::default().validate().unwrap_err().to_string()
        });
        assert!(err.contains("GROQ_API_KEY"));
    }

    #[test]
    #[serial]
    fn test_validate_requires_search_key() {
        let err = with_env(&[("GROQ_API_KEY", Some("gsk-test")), ("TAVILY_API_KEY", None)], || {
            Config::default().validate().unwrap_err().to_string()
        });
        assert!(err.contains("TAVILY_API_KEY"));
    }

    #[test]
    #[serial]
    fn test_validate_with_keys() {
        let result = with_env(
            &[("GROQ_API_KEY", Some("gsk-test")), ("TAVILY_API_KEY", Some("tvly-test"))],
            || Config::default().validate(),
        );
        assert!(result.is_ok());
    }

    #[test]
    #[serial]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "anthropic".to_string();
        let result = with_env(
            &[("GROQ_API_KEY", Some("gsk-test")), ("TAVILY_API_KEY", Some("tvly-test"))],
            || config.validate(),
        );
        assert!(result.unwrap_err().to_string().contains("Unknown LLM provider"));
    }

    #[test]
    #[serial]
    fn test_blank_key_counts_as_missing() {
        let key = with_env(&[("TAVILY_API_KEY", Some("  "))], || SearchConfig::default().tavily_api_key());
        assert!(key.is_none());
    }
}
