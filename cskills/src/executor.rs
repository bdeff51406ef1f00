//! Executes one reconstructed tool call against the registry under a time bound.
//!
//! Every failure becomes an [`ExecutionResult`] carrying a [`SkillError`], so one
//! bad call never aborts the calls queued behind it.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cprovider::ToolCall;
use futures_util::FutureExt;

use crate::{
    ExecutionResult, NoopSkillExecutionHooks, SkillArgs, SkillContext, SkillError,
    SkillExecutionHooks, SkillFuture, SkillOutput, SkillRegistry,
};

pub const DEFAULT_SKILL_TIMEOUT: Duration = Duration::from_secs(30);

pub trait SkillRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: SkillContext,
    ) -> SkillFuture<'a, ExecutionResult>;
}

#[derive(Clone)]
pub struct SkillExecutor {
    registry: Arc<SkillRegistry>,
    timeout: Duration,
    validate_arguments: bool,
    hooks: Arc<dyn SkillExecutionHooks>,
}

impl SkillExecutor {
    pub fn new(registry: Arc<SkillRegistry>) -> Self {
        Self {
            registry,
            timeout: DEFAULT_SKILL_TIMEOUT,
            validate_arguments: true,
            hooks: Arc::new(NoopSkillExecutionHooks),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_argument_validation(mut self, enabled: bool) -> Self {
        self.validate_arguments = enabled;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn SkillExecutionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<SkillRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(
        &self,
        tool_call: &ToolCall,
        context: &SkillContext,
    ) -> Result<SkillOutput, SkillError> {
        let (definition, handler) = self.registry.resolve(&tool_call.name)?;
        let args = SkillArgs::parse(&tool_call.arguments);

        if self.validate_arguments {
            args.validate(&definition.parameters)
                .into_result(&definition.name)?;
        }

        // Polled inside the guard so panics raised while building the future are caught too.
        let call = async move { handler.call(args, context).await };
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => result,
            Err(_) => Err(SkillError::execution(format!(
                "skill '{}' panicked while running",
                tool_call.name
            ))),
        }
    }
}

impl std::fmt::Debug for SkillExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillExecutor")
            .field("registry", &self.registry)
            .field("timeout", &self.timeout)
            .field("validate_arguments", &self.validate_arguments)
            .finish()
    }
}

impl SkillRuntime for SkillExecutor {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: SkillContext,
    ) -> SkillFuture<'a, ExecutionResult> {
        Box::pin(async move {
            let started_at = Instant::now();
            self.hooks.on_execution_start(&tool_call, &context);
            tracing::debug!(
                phase = "skill",
                event = "execution_started",
                skill_name = %tool_call.name,
                tool_call_id = %tool_call.id
            );

            let outcome = ccommon::timeout(self.timeout, self.run(&tool_call, &context))
                .await
                .unwrap_or_else(|elapsed| {
                    Err(SkillError::timeout(format!(
                        "skill '{}' did not finish within {}s",
                        tool_call.name,
                        elapsed.after.as_secs_f64()
                    ))
                    .with_hint("The skill took too long. Try again or continue without it."))
                });
            let elapsed = started_at.elapsed();

            match outcome {
                Ok(output) => {
                    self.hooks
                        .on_execution_success(&tool_call, &context, &output, elapsed);
                    ExecutionResult::success(&tool_call, output, elapsed)
                }
                Err(error) => {
                    let error = error
                        .with_skill_name(&tool_call.name)
                        .with_tool_call_id(&tool_call.id);
                    tracing::debug!(
                        phase = "skill",
                        event = "execution_failed",
                        skill_name = %tool_call.name,
                        tool_call_id = %tool_call.id,
                        error_kind = error.kind.error_type(),
                        elapsed_ms = elapsed.as_millis() as u64
                    );
                    self.hooks
                        .on_execution_failure(&tool_call, &context, &error, elapsed);
                    ExecutionResult::failure(&tool_call, error, elapsed)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;
    use crate::{SkillDefinition, SkillErrorKind, SkillOutcome};

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl SkillExecutionHooks for RecordingHooks {
        fn on_execution_start(&self, tool_call: &ToolCall, _context: &SkillContext) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", tool_call.name));
        }

        fn on_execution_success(
            &self,
            tool_call: &ToolCall,
            _context: &SkillContext,
            _output: &SkillOutput,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{}", tool_call.name));
        }

        fn on_execution_failure(
            &self,
            tool_call: &ToolCall,
            _context: &SkillContext,
            error: &SkillError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{}:{}", tool_call.name, error.kind.error_type()));
        }
    }

    fn registry_with_counter() -> Arc<SkillRegistry> {
        let registry = SkillRegistry::new();
        registry
            .register_skill(SkillDefinition::new(
                "count_args",
                "Counts the arguments it receives",
                json!({"type": "object", "properties": {"n": {"type": "integer"}}}),
            ))
            .expect("register");
        registry.register_sync_fn("count_args", |args, _ctx| {
            Ok(SkillOutput::Json(json!({"count": args.len()})))
        });
        Arc::new(registry)
    }

    #[tokio::test]
    async fn empty_and_malformed_arguments_still_dispatch() {
        let executor = SkillExecutor::new(registry_with_counter());

        for raw in ["", "{\"n\":", "not json"] {
            let result = executor
                .execute(
                    ToolCall::new("call_1", "count_args", raw),
                    SkillContext::new("session-1"),
                )
                .await;
            assert!(result.is_success(), "arguments {raw:?} should dispatch");
            assert_eq!(result.content(), r#"{"count":0}"#);
        }
    }

    #[tokio::test]
    async fn schema_violations_fail_only_the_call() {
        let hooks = Arc::new(RecordingHooks::default());
        let executor = SkillExecutor::new(registry_with_counter()).with_hooks(hooks.clone());

        let result = executor
            .execute(
                ToolCall::new("call_2", "count_args", r#"{"n":"three"}"#),
                SkillContext::new("session-2"),
            )
            .await;

        let error = result.error().expect("validation should fail");
        assert_eq!(error.kind, SkillErrorKind::InvalidArguments);
        assert_eq!(error.tool_call_id.as_deref(), Some("call_2"));

        let payload: Value = serde_json::from_str(&result.content()).expect("payload json");
        assert_eq!(payload["error"], true);
        assert_eq!(payload["error_type"], "validation_error");
        assert_eq!(payload["skill"], "count_args");

        assert_eq!(
            hooks.events.lock().expect("events lock").clone(),
            vec!["start:count_args", "failure:count_args:validation_error"]
        );

        let unchecked = SkillExecutor::new(registry_with_counter())
            .with_argument_validation(false)
            .execute(
                ToolCall::new("call_3", "count_args", r#"{"n":"three"}"#),
                SkillContext::new("session-2"),
            )
            .await;
        assert!(unchecked.is_success());
    }

    #[tokio::test]
    async fn slow_skills_time_out_with_a_distinct_kind() {
        let registry = SkillRegistry::new();
        registry
            .register_skill(SkillDefinition::without_parameters("sleepy", "Never finishes"))
            .expect("register");
        registry.register_fn("sleepy", |_args, _ctx| async move {
            futures_timer::Delay::new(Duration::from_secs(10)).await;
            Ok(SkillOutput::from("late"))
        });

        let executor =
            SkillExecutor::new(Arc::new(registry)).with_timeout(Duration::from_millis(20));
        let result = executor
            .execute(
                ToolCall::new("call_4", "sleepy", "{}"),
                SkillContext::new("session-3"),
            )
            .await;

        match result.outcome {
            SkillOutcome::Failure(error) => assert_eq!(error.kind, SkillErrorKind::Timeout),
            SkillOutcome::Success(_) => panic!("sleepy skill should time out"),
        }
    }

    #[tokio::test]
    async fn panicking_handlers_become_execution_errors() {
        let registry = SkillRegistry::new();
        registry
            .register_skill(SkillDefinition::without_parameters("explode", "Panics"))
            .expect("register");
        registry.register_sync_fn("explode", |_args, _ctx| -> Result<SkillOutput, SkillError> {
            panic!("handler bug")
        });

        let result = SkillExecutor::new(Arc::new(registry))
            .execute(
                ToolCall::new("call_5", "explode", "{}"),
                SkillContext::new("session-4"),
            )
            .await;

        assert_eq!(
            result.error().map(|error| error.kind),
            Some(SkillErrorKind::Execution)
        );
    }
}
