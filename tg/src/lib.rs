//! TripGenie - tool-calling travel planning assistant
//!
//! TripGenie turns a validated trip request into a day-by-day itinerary by
//! letting a chat model call web-search tools until it can answer.
//!
//! # Modules
//!
//! - [`planner`] - The tool-calling state machine (`generate` and `stream`)
//! - [`llm`] - Chat model client trait and OpenAI-compatible implementation
//! - [`tools`] - Search tools (Tavily, DuckDuckGo) and their executor
//! - [`geocoder`] - Rate-limited place search over Nominatim
//! - [`validation`] - Trip input checks and text sanitizing
//! - [`request`] - Composes the planning request from traveler preferences
//! - [`events`] - Api-call telemetry
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod events;
pub mod geocoder;
pub mod llm;
pub mod planner;
pub mod prompts;
pub mod request;
pub mod tools;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use events::{ApiCallLogger, ApiCallStatus, Telemetry};
pub use geocoder::{Geocoder, Location};
pub use llm::{ChatMessage, LlmClient, LlmError, create_client};
pub use planner::{FinishReason, PlanOutcome, PlanRun, TripPlanner};
pub use request::TripRequest;
pub use tools::{ToolExecutor, ToolKind};
pub use validation::{TripInput, ValidationError, validate_complete_trip_input};
