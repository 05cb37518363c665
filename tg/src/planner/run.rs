//! PlanRun - one planning conversation driven step by step
//!
//! States:
//! - model turn: send the whole conversation, append the one assistant reply
//! - tool turn: run each requested call in order, appending one tool result
//!   per call, then go back to a model turn
//! - finished: an assistant message without tool calls was appended
//!
//! Every [`PlanRun::step`] appends exactly one message and returns a copy of
//! it, so callers can drive the run to the end or stream it.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::llm::{ChatMessage, CompletionRequest, LlmClient, ToolCall, ToolDefinition};
use crate::tools::ToolExecutor;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The model answered without requesting tools
    Complete,
    /// The model call failed; the last message is a synthetic apology
    ModelError,
    /// The turn ceiling was hit; the last message is synthetic
    TurnLimit,
}

impl FinishReason {
    /// True when the final message was written by the planner, not the model
    pub fn is_synthetic(self) -> bool {
        !matches!(self, FinishReason::Complete)
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Text of the final assistant message
    pub content: String,
    /// Full transcript, system message first
    pub conversation: Vec<ChatMessage>,
    pub finish: FinishReason,
    /// Model turns taken
    pub turns: u32,
}

enum RunState {
    ModelTurn,
    ToolTurn(VecDeque<ToolCall>),
    Finished(FinishReason),
}

/// Message substituted for a failed model call
pub fn model_error_message(error: &impl std::fmt::Display) -> String {
    format!(
        "I encountered an error while processing your request: {}. Please try again or rephrase your query.",
        error
    )
}

/// Message substituted when the turn ceiling is reached
pub fn turn_limit_message(max_turns: u32) -> String {
    format!(
        "I stopped planning because the tool-call limit was reached ({} model turns) before I had a final answer. \
         Please try again or narrow your request.",
        max_turns
    )
}

/// A single planning conversation
pub struct PlanRun {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolExecutor>,
    tool_defs: Vec<ToolDefinition>,
    max_turns: u32,
    max_tokens: Option<u32>,
    conversation: Vec<ChatMessage>,
    state: RunState,
    turns: u32,
}

impl PlanRun {
    pub(crate) fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolExecutor>,
        system_prompt: &str,
        mut conversation: Vec<ChatMessage>,
        max_turns: u32,
        max_tokens: Option<u32>,
    ) -> Self {
        debug!(message_count = conversation.len(), max_turns, "PlanRun::new: called");
        if !matches!(conversation.first(), Some(ChatMessage::System { .. })) {
            debug!("PlanRun::new: prepending system prompt");
            conversation.insert(0, ChatMessage::system(system_prompt));
        }
        let tool_defs = tools.definitions();
        Self {
            llm,
            tools,
            tool_defs,
            max_turns,
            max_tokens,
            conversation,
            state: RunState::ModelTurn,
            turns: 0,
        }
    }

    pub fn conversation(&self) -> &[ChatMessage] {
        &self.conversation
    }

    /// `Some` once the run has ended
    pub fn finish_reason(&self) -> Option<FinishReason> {
        match self.state {
            RunState::Finished(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Advance by one message; `None` once the run has finished
    pub async fn step(&mut self) -> Option<ChatMessage> {
        let state = std::mem::replace(&mut self.state, RunState::ModelTurn);
        let (message, next) = match state {
            RunState::Finished(reason) => {
                self.state = RunState::Finished(reason);
                return None;
            }
            RunState::ModelTurn => self.model_turn().await,
            RunState::ToolTurn(pending) => self.tool_turn(pending).await,
        };
        self.state = next;
        self.conversation.push(message.clone());
        Some(message)
    }

    async fn model_turn(&mut self) -> (ChatMessage, RunState) {
        if self.turns >= self.max_turns {
            warn!(max_turns = self.max_turns, "Planner turn limit reached");
            return (
                ChatMessage::assistant(turn_limit_message(self.max_turns)),
                RunState::Finished(FinishReason::TurnLimit),
            );
        }

        self.turns += 1;
        debug!(turn = self.turns, message_count = self.conversation.len(), "PlanRun::model_turn: calling LLM");
        let request = CompletionRequest {
            messages: self.conversation.clone(),
            tools: self.tool_defs.clone(),
            max_tokens: self.max_tokens,
        };

        match self.llm.complete(request).await {
            Ok(response) => {
                debug!(turn = self.turns, stop_reason = ?response.stop_reason, "PlanRun::model_turn: response received");
                let message = response.into_message();
                let next = if message.requests_tools() {
                    RunState::ToolTurn(message.tool_calls().iter().cloned().collect())
                } else {
                    RunState::Finished(FinishReason::Complete)
                };
                (message, next)
            }
            Err(e) => {
                warn!(turn = self.turns, error = %e, "Planner model call failed");
                (
                    ChatMessage::assistant(model_error_message(&e)),
                    RunState::Finished(FinishReason::ModelError),
                )
            }
        }
    }

    async fn tool_turn(&mut self, mut pending: VecDeque<ToolCall>) -> (ChatMessage, RunState) {
        // ToolTurn is only entered with at least one call
        let Some(call) = pending.pop_front() else {
            return self.model_turn().await;
        };

        info!(tool = %call.name, call_id = %call.id, "Executing tool call");
        let result = self.tools.execute(&call).await;
        if result.is_error {
            debug!(tool = %call.name, content = %result.content, "PlanRun::tool_turn: tool returned error");
        }

        let message = ChatMessage::tool_result(call.id, call.name, result.content, result.is_error);
        let next = if pending.is_empty() {
            RunState::ModelTurn
        } else {
            RunState::ToolTurn(pending)
        };
        (message, next)
    }

    /// Drive the run to its end
    pub async fn finish(mut self) -> PlanOutcome {
        while self.step().await.is_some() {}

        let finish = self.finish_reason().unwrap_or(FinishReason::Complete);
        let content = self
            .conversation
            .last()
            .and_then(ChatMessage::text)
            .unwrap_or_default()
            .to_string();

        PlanOutcome {
            content,
            conversation: self.conversation,
            finish,
            turns: self.turns,
        }
    }
}
