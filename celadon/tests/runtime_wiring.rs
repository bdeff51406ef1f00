use std::fs;
use std::sync::{Arc, Mutex};

use celadon::{
    BoxedEventStream, ChatTurnRequest, FinishReason, ModelProvider, ModelRequest, ProviderError,
    ProviderFuture, ProviderId, Role, RuntimeConfig, RuntimeErrorKind, StaticSkillConfig,
    StreamEvent, ToolCallFragment, VecEventStream, build_runtime_with,
};
use tempfile::TempDir;

/// Asks for a UUID on the first request and answers in text afterwards.
#[derive(Default)]
struct UuidRequestingProvider {
    requests: Mutex<Vec<ModelRequest>>,
}

impl UuidRequestingProvider {
    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for UuidRequestingProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let mut requests = self.requests.lock().expect("requests lock");
            let events = if requests.is_empty() {
                vec![
                    Ok(StreamEvent::ToolCallFragment(
                        ToolCallFragment::at(0)
                            .with_id("call_1")
                            .with_name("generate_uuid")
                            .with_arguments("{}"),
                    )),
                    Ok(StreamEvent::Finish(FinishReason::ToolCalls)),
                ]
            } else {
                vec![
                    Ok(StreamEvent::TextDelta("Here is your id.".into())),
                    Ok(StreamEvent::Finish(FinishReason::Stop)),
                ]
            };
            requests.push(request);
            Ok(Box::pin(VecEventStream::new(events)) as BoxedEventStream<'a>)
        })
    }
}

fn write_unbound_skill(dir: &TempDir) {
    fs::write(
        dir.path().join("stock_lookup.json"),
        r#"{"name":"stock lookup","description":"Looks up a quote","parameters":{"type":"object","properties":{}},"handler":"quotes"}"#,
    )
    .expect("write skill");
    fs::write(dir.path().join("broken.json"), "{").expect("write broken skill");
}

#[tokio::test]
async fn runtime_runs_builtin_skills_between_rounds() {
    let dir = TempDir::new().expect("temp dir");
    write_unbound_skill(&dir);

    let provider = Arc::new(UuidRequestingProvider::default());
    let config = RuntimeConfig::default()
        .with_skills_dir(dir.path())
        .with_system_prompt("You are terse.");
    let runtime = build_runtime_with(
        config,
        provider.clone(),
        Arc::new(StaticSkillConfig::new()),
    )
    .expect("runtime builds");

    assert_eq!(runtime.load_report.loaded, vec!["stock lookup".to_string()]);
    assert_eq!(runtime.load_report.failures.len(), 1);
    assert!(runtime.registry.contains("generate_uuid"));
    assert!(runtime.registry.contains("stock lookup"));
    assert!(!runtime.registry.contains("save_note"), "no data directory configured");

    let session = runtime.session("session-1").expect("session");
    assert_eq!(session.model, "gpt-4o-mini");

    let result = runtime
        .chat
        .run_turn(ChatTurnRequest::new(session, "give me an id"))
        .await
        .expect("turn completes");

    assert_eq!(result.assistant_message, "Here is your id.");
    assert_eq!(result.tool_rounds, 1);
    assert_eq!(result.skill_results.len(), 1);
    assert!(result.skill_results[0].is_success());

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages[0].role, Role::System);
    let offered: Vec<_> = requests[0].tools.iter().map(|tool| tool.name.as_str()).collect();
    assert!(offered.contains(&"generate_uuid"));
    assert!(!offered.contains(&"stock lookup"), "definitions without code are not offered");
    assert_eq!(requests[1].messages.last().map(|message| message.role), Some(Role::Tool));
}

#[tokio::test]
async fn unknown_backends_without_a_model_cannot_open_sessions() {
    let runtime = build_runtime_with(
        RuntimeConfig::new("http://localhost:11434/v1"),
        Arc::new(UuidRequestingProvider::default()),
        Arc::new(StaticSkillConfig::new()),
    )
    .expect("runtime builds");

    let error = runtime.session("session-1").expect_err("no model");
    assert_eq!(error.kind, RuntimeErrorKind::Configuration);

    let error = runtime.select_model(false).await.expect_err("no model");
    assert_eq!(error.kind, RuntimeErrorKind::Configuration);
}

#[tokio::test]
async fn listing_failures_fall_back_to_heuristic_selection() {
    let runtime = build_runtime_with(
        RuntimeConfig::default().with_model("gpt-4o-preview-internal"),
        Arc::new(UuidRequestingProvider::default()),
        Arc::new(StaticSkillConfig::new()),
    )
    .expect("runtime builds");

    // The fake provider has no listing endpoint, so validation falls back to heuristics.
    let selection = runtime.select_model(false).await.expect("heuristic selection");
    assert!(!selection.forced);
    assert!(selection.supports_tools());
    assert_eq!(selection.model.provider, ProviderId::OpenAi);
}

#[tokio::test]
async fn data_directory_enables_notes_and_reminders() {
    let dir = TempDir::new().expect("temp dir");
    let runtime = build_runtime_with(
        RuntimeConfig::default().with_data_dir(dir.path().join("data")),
        Arc::new(UuidRequestingProvider::default()),
        Arc::new(StaticSkillConfig::new()),
    )
    .expect("runtime builds");

    for name in ["save_note", "get_note", "list_notes", "set_reminder", "list_reminders"] {
        assert!(runtime.registry.has_handler(name), "{name} is not bound");
    }
    assert!(runtime.registry.has_handler("convert_timezone"));
    assert!(runtime.registry.has_handler("generate_password"));
}
