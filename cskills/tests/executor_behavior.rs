use std::sync::Arc;

use cprovider::ToolCall;
use cskills::builtin::register_builtin_skills;
use cskills::{
    SkillContext, SkillDefinition, SkillErrorKind, SkillExecutor, SkillRegistry, SkillRuntime,
    StaticSkillConfig,
};
use serde_json::Value;

fn executor() -> SkillExecutor {
    let registry = SkillRegistry::new();
    register_builtin_skills(&registry, Arc::new(StaticSkillConfig::new()))
        .expect("built-ins register");
    registry
        .register_skill(SkillDefinition::without_parameters(
            "defined_but_unbound",
            "Declared on disk with no code behind it",
        ))
        .expect("register definition");
    SkillExecutor::new(Arc::new(registry))
}

fn payload(content: &str) -> Value {
    serde_json::from_str(content).expect("content should be JSON")
}

#[tokio::test]
async fn lookup_failures_become_model_legible_results() {
    let executor = executor();
    let context = SkillContext::new("session-1");

    let missing = executor
        .execute(ToolCall::new("call_1", "unregistered_skill", "{}"), context.clone())
        .await;
    assert_eq!(missing.error().map(|error| error.kind), Some(SkillErrorKind::NotFound));
    assert_eq!(payload(&missing.content())["error_type"], "skill_not_found");

    let unbound = executor
        .execute(ToolCall::new("call_2", "defined_but_unbound", "{}"), context)
        .await;
    assert_eq!(unbound.error().map(|error| error.kind), Some(SkillErrorKind::NoHandler));
    assert_eq!(payload(&unbound.content())["error_type"], "no_handler");
    assert_eq!(unbound.tool_call_id, "call_2");
}

#[tokio::test]
async fn builtins_run_through_the_executor() {
    let executor = executor();
    let context = SkillContext::new("session-2");

    let encoded = executor
        .execute(
            ToolCall::new("call_3", "base64_encode", r#"{"text":"celadon"}"#),
            context.clone(),
        )
        .await;
    assert!(encoded.is_success());
    assert_eq!(payload(&encoded.content())["encoded"], "Y2VsYWRvbg==");

    let uuid = executor
        .execute(ToolCall::new("call_4", "generate_uuid", ""), context.clone())
        .await;
    assert!(uuid.is_success(), "empty arguments should be accepted");
    assert_eq!(
        payload(&uuid.content())["uuid"].as_str().map(str::len),
        Some(36)
    );

    let weather = executor
        .execute(ToolCall::new("call_5", "get_weather", "{}"), context)
        .await;
    let body = payload(&weather.content());
    assert_eq!(body["error"], true);
    assert_eq!(body["error_type"], "config_error");
    assert_eq!(body["skill"], "get_weather");
    assert_eq!(
        body["config_command"],
        "celadon config --set-weather-zip <zip>"
    );
}

#[tokio::test]
async fn missing_required_arguments_are_reported_by_schema_validation() {
    let result = executor()
        .execute(
            ToolCall::new("call_6", "generate_hash", r#"{"text":"abc"}"#),
            SkillContext::new("session-3"),
        )
        .await;

    let error = result.error().expect("missing algorithm should fail");
    assert_eq!(error.kind, SkillErrorKind::InvalidArguments);
    assert_eq!(payload(&result.content())["error_type"], "validation_error");
}
