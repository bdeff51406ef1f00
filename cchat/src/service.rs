//! Turn orchestration: stream a completion, run requested skills, feed results back.

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ccommon::{TraceId, timeout};
use cprovider::{
    Message, ModelProvider, ModelRequest, ProviderCapabilities, Role, StreamAccumulator,
    StreamCompletion, TokenUsage, ToolCall, ToolDefinition,
};
use cskills::{SkillContext, SkillExecutor, SkillRegistry, SkillRuntime};
use futures_util::StreamExt;
use futures_util::future::{Either, select};
use tokio_util::sync::CancellationToken;

use crate::{
    ChatError, ChatEvent, ChatEventObserver, ChatSession, ChatTurnHooks, ChatTurnRequest,
    ChatTurnResult, ConversationStore, InMemoryConversationStore, NoopChatEventObserver,
    NoopChatTurnHooks,
};

pub const DEFAULT_MAX_TOOL_ROUND_TRIPS: usize = 4;

/// Whether skill definitions are sent with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolOffer {
    /// Offer tools when the provider table says the session's model can use them.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatPolicy {
    pub max_tool_round_trips: usize,
    pub offer_tools: ToolOffer,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_tool_round_trips: DEFAULT_MAX_TOOL_ROUND_TRIPS,
            offer_tools: ToolOffer::Auto,
        }
    }
}

impl ChatPolicy {
    pub fn with_max_tool_round_trips(mut self, max_tool_round_trips: usize) -> Self {
        self.max_tool_round_trips = max_tool_round_trips;
        self
    }

    pub fn with_tool_offer(mut self, offer_tools: ToolOffer) -> Self {
        self.offer_tools = offer_tools;
        self
    }
}

pub struct ChatServiceBuilder {
    provider: Arc<dyn ModelProvider>,
    store: Option<Arc<dyn ConversationStore>>,
    registry: Option<Arc<SkillRegistry>>,
    runtime: Option<Arc<dyn SkillRuntime>>,
    policy: ChatPolicy,
    hooks: Arc<dyn ChatTurnHooks>,
}

impl ChatServiceBuilder {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            store: None,
            registry: None,
            runtime: None,
            policy: ChatPolicy::default(),
            hooks: Arc::new(NoopChatTurnHooks),
        }
    }

    pub fn store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses the executor both to run tool calls and, through its registry, to list tools.
    pub fn skills(mut self, executor: SkillExecutor) -> Self {
        self.registry = Some(executor.registry());
        self.runtime = Some(Arc::new(executor));
        self
    }

    pub fn skill_runtime(
        mut self,
        registry: Arc<SkillRegistry>,
        runtime: Arc<dyn SkillRuntime>,
    ) -> Self {
        self.registry = Some(registry);
        self.runtime = Some(runtime);
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ChatTurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> ChatService {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(SkillRegistry::new()));
        let runtime = self
            .runtime
            .unwrap_or_else(|| Arc::new(SkillExecutor::new(Arc::clone(&registry))));

        ChatService {
            provider: self.provider,
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryConversationStore::new())),
            registry,
            runtime,
            policy: self.policy,
            hooks: self.hooks,
        }
    }
}

#[derive(Clone)]
pub struct ChatService {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn ConversationStore>,
    registry: Arc<SkillRegistry>,
    runtime: Arc<dyn SkillRuntime>,
    policy: ChatPolicy,
    hooks: Arc<dyn ChatTurnHooks>,
}

impl ChatService {
    pub fn new(provider: Arc<dyn ModelProvider>, store: Arc<dyn ConversationStore>) -> Self {
        ChatServiceBuilder::new(provider).store(store).build()
    }

    pub fn builder(provider: Arc<dyn ModelProvider>) -> ChatServiceBuilder {
        ChatServiceBuilder::new(provider)
    }

    pub fn policy(&self) -> ChatPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<SkillRegistry> {
        &self.registry
    }

    /// Whether a turn in `session` would send tool definitions.
    pub fn offers_tools(&self, session: &ChatSession) -> bool {
        match self.policy.offer_tools {
            ToolOffer::Always => true,
            ToolOffer::Never => false,
            ToolOffer::Auto => ProviderCapabilities::supports_tools(session.provider, &session.model),
        }
    }

    pub async fn run_turn(&self, request: ChatTurnRequest) -> Result<ChatTurnResult, ChatError> {
        self.run_turn_with_observer(request, &NoopChatEventObserver)
            .await
    }

    /// Runs one turn, delivering chunks and skill results to `observer` as they happen.
    ///
    /// The user message and everything the turn produced are committed to the store
    /// together, only once the turn succeeds.
    pub async fn run_turn_with_observer(
        &self,
        request: ChatTurnRequest,
        observer: &dyn ChatEventObserver,
    ) -> Result<ChatTurnResult, ChatError> {
        let started = Instant::now();
        let session_id = request.session.id.clone();
        let cancellation = request.cancellation.clone();
        let deadline = request.deadline;

        self.hooks.on_turn_start(&request);
        tracing::debug!(
            phase = "chat",
            event = "turn_started",
            session_id = %session_id,
            provider = %request.session.provider,
            model = %request.session.model,
        );

        let outcome = guard_turn(self.drive_turn(request, observer), cancellation, deadline).await;
        let elapsed = started.elapsed();

        match &outcome {
            Ok(result) => {
                self.hooks.on_turn_success(result, elapsed);
                tracing::debug!(
                    phase = "chat",
                    event = "turn_completed",
                    session_id = %session_id,
                    finish_reason = %result.finish_reason.as_str(),
                    tool_rounds = result.tool_rounds,
                    elapsed_ms = elapsed.as_millis() as u64,
                );
            }
            Err(error) => {
                self.hooks.on_turn_failure(&session_id, error, elapsed);
                tracing::warn!(
                    phase = "chat",
                    event = "turn_failed",
                    session_id = %session_id,
                    error_kind = ?error.kind,
                    error = %error.message,
                    elapsed_ms = elapsed.as_millis() as u64,
                );
            }
        }

        outcome
    }

    async fn drive_turn(
        &self,
        request: ChatTurnRequest,
        observer: &dyn ChatEventObserver,
    ) -> Result<ChatTurnResult, ChatError> {
        if request.user_input.trim().is_empty() {
            return Err(ChatError::invalid_request("user_input must not be empty"));
        }

        let ChatTurnRequest {
            session,
            user_input,
            temperature,
            max_tokens,
            trace_id,
            ..
        } = request;

        let mut history = Vec::new();
        if let Some(system_prompt) = &session.system_prompt {
            history.push(Message::new(Role::System, system_prompt.clone()));
        }
        history.extend(self.store.load_messages(&session.id).await?);

        let tools = if self.offers_tools(&session) {
            self.bound_tools()
        } else {
            Vec::new()
        };

        let mut context = SkillContext::new(session.id.clone());
        if let Some(trace_id) = &trace_id {
            context = context.with_trace_id(trace_id.clone());
        }

        let mut turn = vec![Message::new(Role::User, user_input)];
        let mut usage = TokenUsage::default();
        let mut dispatched = Vec::new();
        let mut skill_results = Vec::new();
        let mut rounds = 0;

        let (completion, tool_round_limit_reached) = loop {
            let model_request = TurnRequest {
                session: &session,
                history: &history,
                turn: &turn,
                tools: &tools,
                temperature,
                max_tokens,
                trace_id: trace_id.as_ref(),
            }
            .build()?;

            let completion = self.stream_round(model_request, observer).await?;
            if let Some(round_usage) = completion.usage {
                usage.accumulate(round_usage);
            }

            let calls = runnable_calls(&completion.tool_calls);
            if calls.is_empty() {
                break (completion, false);
            }

            if tools.is_empty() {
                tracing::warn!(
                    phase = "chat",
                    event = "unoffered_tool_calls_ignored",
                    session_id = %session.id,
                    count = calls.len(),
                );
                break (completion, false);
            }

            if rounds >= self.policy.max_tool_round_trips {
                self.hooks
                    .on_tool_round_limit(&session.id, self.policy.max_tool_round_trips);
                tracing::warn!(
                    phase = "chat",
                    event = "tool_round_limit_reached",
                    session_id = %session.id,
                    max_rounds = self.policy.max_tool_round_trips,
                );
                break (completion, true);
            }

            rounds += 1;
            self.hooks.on_tool_round_start(&session.id, rounds, &calls);
            turn.push(Message::assistant_with_tool_calls(
                completion.content.clone(),
                calls.clone(),
            ));

            // One call at a time; each result lands in the transcript before the next starts.
            for call in calls {
                let result = self.runtime.execute(call.clone(), context.clone()).await;
                turn.push(result.to_message());
                observer.on_event(&ChatEvent::SkillResult(result.clone()));
                dispatched.push(call);
                skill_results.push(result);
            }
        };

        if !completion.content.is_empty() {
            turn.push(Message::new(Role::Assistant, completion.content.clone()));
        }

        self.store.append_messages(&session.id, turn).await?;

        Ok(ChatTurnResult {
            session_id: session.id,
            assistant_message: completion.content,
            tool_calls: dispatched,
            skill_results,
            finish_reason: completion.finish_reason,
            usage,
            tool_rounds: rounds,
            tool_round_limit_reached,
        })
    }

    /// Reads one provider stream to its end. Any stream error discards what was accumulated.
    async fn stream_round(
        &self,
        request: ModelRequest,
        observer: &dyn ChatEventObserver,
    ) -> Result<StreamCompletion, ChatError> {
        let mut stream = self.provider.stream(request).await?;
        let mut accumulator = StreamAccumulator::new();

        while let Some(event) = stream.next().await {
            if let Some(chunk) = accumulator.feed(event?)? {
                observer.on_event(&ChatEvent::Chunk(chunk));
            }

            if accumulator.is_finished() {
                break;
            }
        }

        if !accumulator.is_finished() {
            let chunk = accumulator.finish()?;
            observer.on_event(&ChatEvent::Chunk(chunk));
        }

        accumulator
            .into_completion()
            .ok_or_else(|| ChatError::transport("stream ended without a completion"))
    }

    fn bound_tools(&self) -> Vec<ToolDefinition> {
        self.registry
            .all_skills()
            .into_iter()
            .filter(|definition| self.registry.has_handler(&definition.name))
            .map(|definition| definition.to_tool_definition())
            .collect()
    }
}

struct TurnRequest<'a> {
    session: &'a ChatSession,
    history: &'a [Message],
    turn: &'a [Message],
    tools: &'a [ToolDefinition],
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    trace_id: Option<&'a TraceId>,
}

impl TurnRequest<'_> {
    fn build(self) -> Result<ModelRequest, ChatError> {
        let messages = self.history.iter().chain(self.turn).cloned().collect();
        let mut builder = ModelRequest::builder(self.session.model.clone())
            .messages(messages)
            .tools(self.tools.to_vec())
            .metadata("session_id", self.session.id.clone())
            .enable_streaming();

        if let Some(value) = self.temperature {
            builder = builder.temperature(value);
        }

        if let Some(value) = self.max_tokens {
            builder = builder.max_tokens(value);
        }

        if let Some(trace_id) = self.trace_id {
            builder = builder.metadata("trace_id", trace_id.to_string());
        }

        Ok(builder.build()?)
    }
}

fn runnable_calls(tool_calls: &[ToolCall]) -> Vec<ToolCall> {
    tool_calls
        .iter()
        .enumerate()
        .filter_map(|(index, call)| {
            if call.is_placeholder() {
                tracing::warn!(
                    phase = "chat",
                    event = "placeholder_tool_call_skipped",
                    index,
                );
                None
            } else {
                Some(call.clone())
            }
        })
        .collect()
}

async fn guard_turn<F>(
    turn: F,
    cancellation: Option<CancellationToken>,
    deadline: Option<Duration>,
) -> Result<ChatTurnResult, ChatError>
where
    F: Future<Output = Result<ChatTurnResult, ChatError>>,
{
    let bounded = async move {
        match deadline {
            Some(limit) => match timeout(limit, turn).await {
                Ok(outcome) => outcome,
                Err(elapsed) => Err(ChatError::timeout(format!(
                    "turn did not finish within {}ms",
                    elapsed.after.as_millis()
                ))),
            },
            None => turn.await,
        }
    };

    let Some(token) = cancellation else {
        return bounded.await;
    };

    if token.is_cancelled() {
        return Err(ChatError::cancelled("turn cancelled before it started"));
    }

    let cancelled = pin!(token.cancelled());
    let bounded = pin!(bounded);
    match select(cancelled, bounded).await {
        Either::Left(((), _)) => Err(ChatError::cancelled("turn cancelled")),
        Either::Right((outcome, _)) => outcome,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use cprovider::{
        BoxedEventStream, FinishReason, ProviderError, ProviderFuture, ProviderId, StreamEvent,
        ToolCallFragment, VecEventStream,
    };

    use super::*;

    #[derive(Debug, Default)]
    struct ScriptedProvider {
        rounds: Mutex<Vec<Vec<Result<StreamEvent, ProviderError>>>>,
        requests: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedProvider {
        fn new(mut rounds: Vec<Vec<Result<StreamEvent, ProviderError>>>) -> Self {
            rounds.reverse();
            Self {
                rounds: Mutex::new(rounds),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModelProvider for ScriptedProvider {
        fn id(&self) -> ProviderId {
            ProviderId::OpenAi
        }

        fn stream<'a>(
            &'a self,
            request: ModelRequest,
        ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
            Box::pin(async move {
                self.requests.lock().expect("requests lock").push(request);
                let events = self
                    .rounds
                    .lock()
                    .expect("rounds lock")
                    .pop()
                    .unwrap_or_default();
                Ok(Box::pin(VecEventStream::new(events)) as BoxedEventStream<'a>)
            })
        }
    }

    fn session() -> ChatSession {
        ChatSession::new("session-1", ProviderId::OpenAi, "gpt-4o-mini")
    }

    #[test]
    fn tool_offer_follows_policy_and_capabilities() {
        let provider = Arc::new(ScriptedProvider::default());
        let auto = ChatService::builder(provider.clone()).build();
        assert!(auto.offers_tools(&session()));
        assert!(!auto.offers_tools(&ChatSession::new("s", ProviderId::Venice, "venice-uncensored")));

        let never = ChatService::builder(provider.clone())
            .policy(ChatPolicy::default().with_tool_offer(ToolOffer::Never))
            .build();
        assert!(!never.offers_tools(&session()));

        let always = ChatService::builder(provider)
            .policy(ChatPolicy::default().with_tool_offer(ToolOffer::Always))
            .build();
        assert!(always.offers_tools(&ChatSession::new("s", ProviderId::Unknown, "local")));
    }

    #[test]
    fn placeholder_slots_are_not_dispatched() {
        let calls = vec![
            ToolCall::new("", "", ""),
            ToolCall::new("call_1", "generate_uuid", "{}"),
        ];

        let runnable = runnable_calls(&calls);
        assert_eq!(runnable.len(), 1);
        assert_eq!(runnable[0].id, "call_1");
    }

    #[tokio::test]
    async fn plain_text_turn_commits_user_and_assistant() {
        let provider = Arc::new(ScriptedProvider::new(vec![vec![
            Ok(StreamEvent::TextDelta("Hel".to_string())),
            Ok(StreamEvent::TextDelta("lo".to_string())),
            Ok(StreamEvent::Finish(FinishReason::Stop)),
        ]]));
        let store = Arc::new(InMemoryConversationStore::new());
        let service = ChatService::new(provider.clone(), store.clone());

        let result = service
            .run_turn(
                ChatTurnRequest::new(session().with_system_prompt("be brief"), "hi")
                    .with_temperature(0.2),
            )
            .await
            .expect("turn should succeed");

        assert_eq!(result.assistant_message, "Hello");
        assert_eq!(result.finish_reason, FinishReason::Stop);
        assert_eq!(result.tool_rounds, 0);

        let requests = provider.requests.lock().expect("requests lock");
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert_eq!(requests[0].options.temperature, Some(0.2));
        assert!(requests[0].options.stream);

        let history = store.load_messages("session-1").await.expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "Hello");
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_any_request() {
        let provider = Arc::new(ScriptedProvider::default());
        let service = ChatService::builder(provider.clone()).build();

        let error = service
            .run_turn(ChatTurnRequest::new(session(), "   "))
            .await
            .expect_err("blank input should fail");

        assert_eq!(error.kind, crate::ChatErrorKind::InvalidRequest);
        assert!(provider.requests.lock().expect("requests lock").is_empty());
    }

    #[tokio::test]
    async fn unoffered_tool_calls_end_the_turn_without_dispatch() {
        let provider = Arc::new(ScriptedProvider::new(vec![vec![
            Ok(StreamEvent::ToolCallFragment(
                ToolCallFragment::at(0)
                    .with_id("call_1")
                    .with_name("generate_uuid")
                    .with_arguments("{}"),
            )),
            Ok(StreamEvent::Finish(FinishReason::ToolCalls)),
        ]]));
        let service = ChatService::builder(provider.clone())
            .policy(ChatPolicy::default().with_tool_offer(ToolOffer::Never))
            .build();

        let result = service
            .run_turn(ChatTurnRequest::new(session(), "id please"))
            .await
            .expect("turn should succeed");

        assert!(result.skill_results.is_empty());
        assert_eq!(result.finish_reason, FinishReason::ToolCalls);
        assert_eq!(provider.requests.lock().expect("requests lock").len(), 1);
    }
}
