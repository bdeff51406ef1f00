use std::sync::{Arc, Mutex};
use std::time::Duration;

use cchat::{ChatError, ChatSession, ChatTurnHooks, ChatTurnRequest, ChatTurnResult};
use cprovider::{
    FinishReason, ProviderError, ProviderId, ProviderOperation, ProviderOperationHooks,
    TokenUsage, ToolCall,
};
use cskills::{
    SkillContext, SkillDefinition, SkillError, SkillExecutionHooks, SkillExecutor, SkillOutput,
    SkillRegistry, SkillRuntime,
};

use crate::{
    MetricsObservabilityHooks, SafeChatHooks, SafeProviderHooks, SafeSkillHooks,
    TracingObservabilityHooks, init_tracing,
};

fn sample_tool_call() -> ToolCall {
    ToolCall::new("call-1", "echo", "{}")
}

fn sample_context() -> SkillContext {
    SkillContext::new("session-1").with_trace_id("trace-1")
}

fn sample_request() -> ChatTurnRequest {
    ChatTurnRequest::new(
        ChatSession::new("session-1", ProviderId::OpenAi, "gpt-4o-mini"),
        "hello",
    )
    .with_trace_id("trace-1")
}

fn sample_result() -> ChatTurnResult {
    ChatTurnResult {
        session_id: "session-1".to_string(),
        assistant_message: "hi".to_string(),
        tool_calls: Vec::new(),
        skill_results: Vec::new(),
        finish_reason: FinishReason::Stop,
        usage: TokenUsage {
            input_tokens: 3,
            output_tokens: 1,
            total_tokens: 4,
        },
        tool_rounds: 0,
        tool_round_limit_reached: false,
    }
}

fn exercise_all<H>(hooks: &H)
where
    H: ProviderOperationHooks + SkillExecutionHooks + ChatTurnHooks,
{
    let provider_error = ProviderError::timeout("provider timeout");
    let skill_error = SkillError::execution("skill failed");
    let chat_error = ChatError::transport("connection reset");
    let operation = ProviderOperation::OpenStream;

    hooks.on_attempt_start(ProviderId::OpenAi, operation, 1);
    hooks.on_retry_scheduled(
        ProviderId::OpenAi,
        operation,
        1,
        Duration::from_millis(10),
        &provider_error,
    );
    ProviderOperationHooks::on_success(hooks, ProviderId::OpenAi, operation, 2);
    ProviderOperationHooks::on_failure(hooks, ProviderId::OpenAi, operation, 2, &provider_error);

    hooks.on_execution_start(&sample_tool_call(), &sample_context());
    hooks.on_execution_success(
        &sample_tool_call(),
        &sample_context(),
        &SkillOutput::from("ok"),
        Duration::from_millis(20),
    );
    hooks.on_execution_failure(
        &sample_tool_call(),
        &sample_context(),
        &skill_error,
        Duration::from_millis(20),
    );

    hooks.on_turn_start(&sample_request());
    hooks.on_tool_round_start("session-1", 1, &[sample_tool_call()]);
    hooks.on_tool_round_limit("session-1", 4);
    hooks.on_turn_success(&sample_result(), Duration::from_millis(30));
    hooks.on_turn_failure("session-1", &chat_error, Duration::from_millis(30));
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    exercise_all(&TracingObservabilityHooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    exercise_all(&MetricsObservabilityHooks);
}

#[test]
fn init_tracing_installs_once() {
    let _ = init_tracing("info");
    assert!(!init_tracing("debug"), "a second install must be refused");
}

#[derive(Default, Clone)]
struct RecordingProviderHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl ProviderOperationHooks for RecordingProviderHooks {
    fn on_attempt_start(&self, _provider: ProviderId, _operation: ProviderOperation, _attempt: u32) {
        self.events.lock().expect("events lock").push("attempt_start");
    }

    fn on_failure(
        &self,
        _provider: ProviderId,
        _operation: ProviderOperation,
        _attempts: u32,
        _error: &ProviderError,
    ) {
        self.events.lock().expect("events lock").push("failure");
    }
}

#[derive(Default, Clone)]
struct RecordingChatHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl ChatTurnHooks for RecordingChatHooks {
    fn on_turn_start(&self, _request: &ChatTurnRequest) {
        self.events.lock().expect("events lock").push("start");
    }

    fn on_turn_success(&self, _result: &ChatTurnResult, _elapsed: Duration) {
        self.events.lock().expect("events lock").push("success");
    }
}

#[test]
fn safe_wrappers_forward_to_inner_hooks() {
    let provider = RecordingProviderHooks::default();
    let safe_provider = SafeProviderHooks::new(provider.clone());
    safe_provider.on_attempt_start(ProviderId::Grok, ProviderOperation::ListModels, 1);
    safe_provider.on_failure(
        ProviderId::Grok,
        ProviderOperation::ListModels,
        1,
        &ProviderError::unavailable("down"),
    );
    assert_eq!(
        *provider.events.lock().expect("events lock"),
        vec!["attempt_start", "failure"]
    );

    let chat = RecordingChatHooks::default();
    let safe_chat = SafeChatHooks::new(chat.clone());
    safe_chat.on_turn_start(&sample_request());
    safe_chat.on_turn_success(&sample_result(), Duration::from_millis(1));
    assert_eq!(*chat.events.lock().expect("events lock"), vec!["start", "success"]);
}

struct PanicHooks;

impl ProviderOperationHooks for PanicHooks {
    fn on_attempt_start(&self, _provider: ProviderId, _operation: ProviderOperation, _attempt: u32) {
        panic!("attempt_start panic");
    }
}

impl SkillExecutionHooks for PanicHooks {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &SkillContext) {
        panic!("start panic");
    }

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &SkillContext,
        _output: &SkillOutput,
        _elapsed: Duration,
    ) {
        panic!("success panic");
    }
}

impl ChatTurnHooks for PanicHooks {
    fn on_turn_failure(&self, _session_id: &str, _error: &ChatError, _elapsed: Duration) {
        panic!("failure panic");
    }
}

#[test]
fn safe_wrappers_swallow_panicking_hooks() {
    SafeProviderHooks::new(PanicHooks).on_attempt_start(
        ProviderId::OpenAi,
        ProviderOperation::OpenStream,
        1,
    );
    SafeSkillHooks::new(PanicHooks).on_execution_start(&sample_tool_call(), &sample_context());
    SafeChatHooks::new(PanicHooks).on_turn_failure(
        "session-1",
        &ChatError::cancelled("stopped"),
        Duration::from_millis(1),
    );
}

#[tokio::test]
async fn panicking_skill_hooks_do_not_break_execution_when_wrapped() {
    let registry = SkillRegistry::new();
    registry
        .register_skill(SkillDefinition::without_parameters("echo", "echoes"))
        .expect("definition");
    registry.register_sync_fn("echo", |_args, _ctx| Ok(SkillOutput::from("echoed")));

    let executor = SkillExecutor::new(Arc::new(registry))
        .with_hooks(Arc::new(SafeSkillHooks::new(PanicHooks)));
    let result = executor.execute(sample_tool_call(), sample_context()).await;

    assert!(result.is_success());
    assert_eq!(result.content(), "echoed");
}
