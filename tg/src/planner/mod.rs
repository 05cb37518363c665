//! Conversational planner
//!
//! [`TripPlanner`] binds a chat model to the search tools and runs the
//! tool-calling loop in [`PlanRun`] until the model answers without asking
//! for more tools. Failures never escape: a failed model call or an exhausted
//! turn budget ends the run with a synthetic assistant message.

mod run;

pub use run::{FinishReason, PlanOutcome, PlanRun, model_error_message, turn_limit_message};

use std::sync::Arc;
use std::time::Instant;

use futures::Stream;
use tracing::{debug, info};

use crate::config::PlannerConfig;
use crate::events::{ApiCallStatus, Telemetry};
use crate::llm::{ChatMessage, LlmClient};
use crate::prompts::embedded;
use crate::tools::ToolExecutor;

/// Operation name reported to telemetry for each `generate`
pub const TRIP_GENERATION: &str = "trip_generation";

/// Tool-augmented trip planner
///
/// Holds only shared, immutable collaborators; concurrent `generate` and
/// `stream` calls each get their own [`PlanRun`].
pub struct TripPlanner {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolExecutor>,
    telemetry: Arc<dyn Telemetry>,
    system_prompt: String,
    max_turns: u32,
    max_tokens: Option<u32>,
}

impl TripPlanner {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolExecutor>,
        telemetry: Arc<dyn Telemetry>,
        config: &PlannerConfig,
    ) -> Self {
        debug!(max_turns = config.max_turns, tools = ?tools.tool_names(), "TripPlanner::new: called");
        Self {
            llm,
            tools,
            telemetry,
            system_prompt: embedded::SYSTEM.to_string(),
            max_turns: config.max_turns,
            max_tokens: config.max_tokens,
        }
    }

    /// Replace the embedded persona
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Start a run for a single planning request
    pub fn start(&self, query: &str) -> PlanRun {
        self.start_conversation(vec![ChatMessage::user(query)])
    }

    /// Start a run from an existing conversation
    ///
    /// The persona is prepended unless the conversation already opens with a
    /// system message.
    pub fn start_conversation(&self, conversation: Vec<ChatMessage>) -> PlanRun {
        PlanRun::new(
            self.llm.clone(),
            self.tools.clone(),
            &self.system_prompt,
            conversation,
            self.max_turns,
            self.max_tokens,
        )
    }

    /// Run to completion and keep the transcript
    pub async fn run(&self, query: &str) -> PlanOutcome {
        debug!(query_len = query.len(), "TripPlanner::run: called");
        self.start(query).finish().await
    }

    /// Run to completion and return the final text
    ///
    /// Reports `trip_generation` to telemetry whatever the outcome; a
    /// synthetic final message counts as failed.
    pub async fn generate(&self, query: &str) -> String {
        self.generate_outcome(query).await.content
    }

    /// Like [`generate`](Self::generate) but keeps the whole [`PlanOutcome`]
    pub async fn generate_outcome(&self, query: &str) -> PlanOutcome {
        info!("Generating trip plan");
        let started = Instant::now();

        let outcome = self.run(query).await;

        let elapsed = started.elapsed();
        let status = if outcome.finish.is_synthetic() {
            ApiCallStatus::Failed
        } else {
            ApiCallStatus::Success
        };
        self.telemetry.record_api_call(TRIP_GENERATION, status, elapsed);
        info!(
            %status,
            finish = ?outcome.finish,
            turns = outcome.turns,
            duration_ms = elapsed.as_millis() as u64,
            "Trip plan generation finished"
        );

        outcome
    }

    /// Lazily yield every assistant and tool-result message as it is produced
    ///
    /// The stream ends after the final assistant message. Each call starts a
    /// fresh run.
    pub fn stream(&self, query: &str) -> impl Stream<Item = ChatMessage> + Send + 'static {
        info!("Streaming trip plan generation");
        futures::stream::unfold(self.start(query), |mut run| async move {
            let message = run.step().await?;
            Some((message, run))
        })
    }
}
