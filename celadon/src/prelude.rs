//! Common imports for Celadon applications.

pub use crate::{
    CancellationToken, ChatEvent, ChatPolicy, ChatService, ChatSession, ChatTurnRequest,
    ChatTurnResult, Message, ModelProvider, ProviderError, ProviderId, Role, RuntimeBundle,
    RuntimeConfig, RuntimeError, SkillContext, SkillDefinition, SkillError, SkillExecutor,
    SkillRegistry, ToolCall, ToolOffer, build_provider, build_runtime, build_runtime_with,
    init_tracing, select_model,
};
