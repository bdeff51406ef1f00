//! Metrics-based observability hooks for provider operations, skill execution, and chat turns.
//!
//! ```rust
//! use cobserve::MetricsObservabilityHooks;
//! use cprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use cchat::{ChatError, ChatTurnHooks, ChatTurnRequest, ChatTurnResult};
use cprovider::{ProviderError, ProviderId, ProviderOperation, ProviderOperationHooks, ToolCall};
use cskills::{SkillContext, SkillError, SkillExecutionHooks, SkillOutput};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: ProviderOperation, _attempt: u32) {
        metrics::counter!(
            "celadon_provider_attempt_start_total",
            "provider" => provider.to_string(),
            "operation" => operation.as_str()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: ProviderOperation,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "celadon_provider_retry_scheduled_total",
            "provider" => provider.to_string(),
            "operation" => operation.as_str(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "celadon_provider_retry_delay_seconds",
            "provider" => provider.to_string(),
            "operation" => operation.as_str()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, provider: ProviderId, operation: ProviderOperation, attempts: u32) {
        metrics::counter!(
            "celadon_provider_success_total",
            "provider" => provider.to_string(),
            "operation" => operation.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "celadon_provider_attempts_per_success",
            "provider" => provider.to_string(),
            "operation" => operation.as_str()
        )
        .record(attempts as f64);
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: ProviderOperation,
        attempts: u32,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "celadon_provider_failure_total",
            "provider" => provider.to_string(),
            "operation" => operation.as_str(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "celadon_provider_attempts_per_failure",
            "provider" => provider.to_string(),
            "operation" => operation.as_str()
        )
        .record(attempts as f64);
    }
}

impl SkillExecutionHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &SkillContext) {
        metrics::counter!(
            "celadon_skill_execution_start_total",
            "skill_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        _context: &SkillContext,
        _output: &SkillOutput,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "celadon_skill_execution_success_total",
            "skill_name" => tool_call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "celadon_skill_execution_duration_seconds",
            "skill_name" => tool_call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &SkillContext,
        error: &SkillError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "celadon_skill_execution_failure_total",
            "skill_name" => tool_call.name.clone(),
            "error_type" => error.kind.error_type()
        )
        .increment(1);
        metrics::histogram!(
            "celadon_skill_execution_duration_seconds",
            "skill_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ChatTurnHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, request: &ChatTurnRequest) {
        metrics::counter!(
            "celadon_chat_turn_start_total",
            "provider" => request.session.provider.to_string()
        )
        .increment(1);
    }

    fn on_tool_round_start(&self, _session_id: &str, _round: usize, tool_calls: &[ToolCall]) {
        metrics::counter!("celadon_chat_tool_round_total").increment(1);
        metrics::histogram!("celadon_chat_tool_calls_per_round").record(tool_calls.len() as f64);
    }

    fn on_tool_round_limit(&self, _session_id: &str, _max_rounds: usize) {
        metrics::counter!("celadon_chat_tool_round_limit_total").increment(1);
    }

    fn on_turn_success(&self, result: &ChatTurnResult, elapsed: Duration) {
        metrics::counter!(
            "celadon_chat_turn_success_total",
            "finish_reason" => result.finish_reason.as_str()
        )
        .increment(1);
        metrics::counter!("celadon_chat_tokens_total").increment(u64::from(result.usage.total_tokens));
        metrics::histogram!("celadon_chat_turn_duration_seconds", "status" => "success")
            .record(elapsed.as_secs_f64());
    }

    fn on_turn_failure(&self, _session_id: &str, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "celadon_chat_turn_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("celadon_chat_turn_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
    }
}
