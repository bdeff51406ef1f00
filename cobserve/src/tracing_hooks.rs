//! Tracing-based observability hooks for provider operations, skill execution, and chat turns.
//!
//! ```rust
//! use cchat::ChatTurnHooks;
//! use cobserve::TracingObservabilityHooks;
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatTurnHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_chat_hooks(&hooks);
//! ```

use std::time::Duration;

use cchat::{ChatError, ChatTurnHooks, ChatTurnRequest, ChatTurnResult};
use cprovider::{ProviderError, ProviderId, ProviderOperation, ProviderOperationHooks, ToolCall};
use cskills::{SkillContext, SkillError, SkillExecutionHooks, SkillOutput};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: ProviderOperation, attempt: u32) {
        tracing::info!(
            phase = "provider",
            event = "attempt_start",
            provider = %provider,
            operation = %operation,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: ProviderOperation,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "retry_scheduled",
            provider = %provider,
            operation = %operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, provider: ProviderId, operation: ProviderOperation, attempts: u32) {
        tracing::info!(
            phase = "provider",
            event = "success",
            provider = %provider,
            operation = %operation,
            attempts
        );
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: ProviderOperation,
        attempts: u32,
        error: &ProviderError,
    ) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            provider = %provider,
            operation = %operation,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl SkillExecutionHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &SkillContext) {
        tracing::info!(
            phase = "skill",
            event = "execution_start",
            skill_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &SkillContext,
        _output: &SkillOutput,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "skill",
            event = "execution_success",
            skill_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &SkillContext,
        error: &SkillError,
        elapsed: Duration,
    ) {
        // Skill failures are reported back to the model, so they are not process errors.
        tracing::warn!(
            phase = "skill",
            event = "execution_failure",
            skill_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.is_retryable(),
            error = %error
        );
    }
}

impl ChatTurnHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, request: &ChatTurnRequest) {
        tracing::info!(
            phase = "chat",
            event = "turn_start",
            session_id = request.session.id,
            provider = %request.session.provider,
            model = request.session.model,
            trace_id = request.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_tool_round_start(&self, session_id: &str, round: usize, tool_calls: &[ToolCall]) {
        tracing::info!(
            phase = "chat",
            event = "tool_round_start",
            session_id,
            round,
            tool_calls = tool_calls.len()
        );
    }

    fn on_tool_round_limit(&self, session_id: &str, max_rounds: usize) {
        tracing::warn!(
            phase = "chat",
            event = "tool_round_limit",
            session_id,
            max_rounds
        );
    }

    fn on_turn_success(&self, result: &ChatTurnResult, elapsed: Duration) {
        tracing::info!(
            phase = "chat",
            event = "turn_success",
            session_id = result.session_id,
            finish_reason = result.finish_reason.as_str(),
            tool_rounds = result.tool_rounds,
            total_tokens = result.usage.total_tokens,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, session_id: &str, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "chat",
            event = "turn_failure",
            session_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}
