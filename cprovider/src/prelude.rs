//! Common `cprovider` imports for downstream crates.

pub use crate::{
    BoxedEventStream, FinishReason, Message, ModelCatalog, ModelEventStream, ModelInfo,
    ModelProvider, ModelRequest, ModelRequestBuilder, ProviderCapabilities, ProviderError,
    ProviderErrorKind, ProviderId, ProviderOperationHooks, RetryPolicy, Role, StreamAccumulator,
    StreamChunk, StreamEvent, TokenUsage, ToolCall, ToolCallFragment, ToolDefinition,
};
pub use ccommon::{BoxFuture, MetadataMap};
