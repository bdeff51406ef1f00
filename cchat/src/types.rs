//! Chat session, turn, and chat event types.

use std::time::Duration;

use ccommon::TraceId;
use cprovider::{FinishReason, ProviderId, StreamChunk, TokenUsage, ToolCall};
use cskills::ExecutionResult;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub id: String,
    pub provider: ProviderId,
    pub model: String,
    pub system_prompt: Option<String>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>, provider: ProviderId, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider,
            model: model.into(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ChatTurnRequest {
    pub session: ChatSession,
    pub user_input: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub trace_id: Option<TraceId>,
    /// Bounds the whole turn, tool rounds included.
    pub deadline: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
}

impl ChatTurnRequest {
    pub fn new(session: ChatSession, user_input: impl Into<String>) -> Self {
        Self {
            session,
            user_input: user_input.into(),
            temperature: None,
            max_tokens: None,
            trace_id: None,
            deadline: None,
            cancellation: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurnResult {
    pub session_id: String,
    pub assistant_message: String,
    /// Every tool call dispatched during the turn, in dispatch order.
    pub tool_calls: Vec<ToolCall>,
    pub skill_results: Vec<ExecutionResult>,
    pub finish_reason: FinishReason,
    pub usage: TokenUsage,
    pub tool_rounds: usize,
    pub tool_round_limit_reached: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Chunk(StreamChunk),
    SkillResult(ExecutionResult),
}

/// Receives turn events in arrival order, on whichever task is reading the stream.
pub trait ChatEventObserver: Send + Sync {
    fn on_event(&self, event: &ChatEvent);
}

impl<F> ChatEventObserver for F
where
    F: Fn(&ChatEvent) + Send + Sync,
{
    fn on_event(&self, event: &ChatEvent) {
        self(event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatEventObserver;

impl ChatEventObserver for NoopChatEventObserver {
    fn on_event(&self, _event: &ChatEvent) {}
}
