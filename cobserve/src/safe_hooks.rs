use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use cchat::{ChatError, ChatTurnHooks, ChatTurnRequest, ChatTurnResult};
use cprovider::{ProviderError, ProviderId, ProviderOperation, ProviderOperationHooks, ToolCall};
use cskills::{SkillContext, SkillError, SkillExecutionHooks, SkillOutput};

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_attempt_start(&self, provider: ProviderId, operation: ProviderOperation, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(provider, operation, attempt)
        }));
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: ProviderOperation,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_retry_scheduled(provider, operation, attempt, delay, error)
        }));
    }

    fn on_success(&self, provider: ProviderId, operation: ProviderOperation, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(provider, operation, attempts)
        }));
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: ProviderOperation,
        attempts: u32,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(provider, operation, attempts, error)
        }));
    }
}

pub struct SafeSkillHooks<H> {
    inner: H,
}

impl<H> SafeSkillHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> SkillExecutionHooks for SafeSkillHooks<H>
where
    H: SkillExecutionHooks,
{
    fn on_execution_start(&self, tool_call: &ToolCall, context: &SkillContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(tool_call, context)
        }));
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &SkillContext,
        output: &SkillOutput,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(tool_call, context, output, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &SkillContext,
        error: &SkillError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(tool_call, context, error, elapsed)
        }));
    }
}

pub struct SafeChatHooks<H> {
    inner: H,
}

impl<H> SafeChatHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ChatTurnHooks for SafeChatHooks<H>
where
    H: ChatTurnHooks,
{
    fn on_turn_start(&self, request: &ChatTurnRequest) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_turn_start(request)));
    }

    fn on_tool_round_start(&self, session_id: &str, round: usize, tool_calls: &[ToolCall]) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_tool_round_start(session_id, round, tool_calls)
        }));
    }

    fn on_tool_round_limit(&self, session_id: &str, max_rounds: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_tool_round_limit(session_id, max_rounds)
        }));
    }

    fn on_turn_success(&self, result: &ChatTurnResult, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_success(result, elapsed)
        }));
    }

    fn on_turn_failure(&self, session_id: &str, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_failure(session_id, error, elapsed)
        }));
    }
}
