//! Single-dependency facade over the Celadon workspace.
//!
//! Re-exports the workspace crates and wires them into a [`RuntimeBundle`]
//! from a [`RuntimeConfig`], usually read from `CELADON_*` variables.
//!
//! ```rust,no_run
//! use celadon::{ChatTurnRequest, RuntimeConfig, build_runtime, init_tracing};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing("info");
//! let runtime = build_runtime(RuntimeConfig::from_env()?)?;
//! let session = runtime.session("session-1")?;
//!
//! let result = runtime
//!     .chat
//!     .run_turn(ChatTurnRequest::new(session, "What's 10 km in miles?"))
//!     .await?;
//! println!("{}", result.assistant_message);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod providers;
mod runtime;
mod selection;

pub mod prelude;

pub use cchat;
pub use ccommon;
pub use cobserve;
pub use cprovider;
pub use cskills;

pub use cchat::{
    CancellationToken, ChatError, ChatErrorKind, ChatEvent, ChatEventObserver, ChatPolicy,
    ChatService, ChatServiceBuilder, ChatSession, ChatTurnHooks, ChatTurnRequest, ChatTurnResult,
    ConversationStore, InMemoryConversationStore, ToolOffer,
};
pub use ccommon::{BoxFuture, MetadataMap, SessionId, TraceId};
pub use cobserve::{
    MetricsObservabilityHooks, SafeChatHooks, SafeProviderHooks, SafeSkillHooks,
    TracingObservabilityHooks, init_tracing,
};
pub use cprovider::{
    BoxedEventStream, FinishReason, ListingSource, Message, ModelCatalog, ModelInfo,
    ModelProvider, ModelRequest, NoopOperationHooks, ProviderCapabilities, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderId, ProviderOperationHooks, RetryPolicy, Role,
    SecretString, StreamAccumulator, StreamChunk, StreamEvent, TokenUsage, ToolCall,
    ToolCallFragment, ToolDefinition, VecEventStream, format_model_list,
};
pub use cskills::{
    EnvSkillConfig, ExecutionResult, LoadReport, SkillConfigSource, SkillContext,
    SkillDefinition, SkillError, SkillErrorKind, SkillExecutor, SkillRegistry, SkillRuntime,
    StaticSkillConfig,
};

pub use config::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, ENV_PREFIX, RuntimeConfig};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use providers::build_provider;
pub use runtime::{RuntimeBundle, build_runtime, build_runtime_with};
pub use selection::{ModelSelection, select_model};
