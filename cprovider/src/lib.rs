//! Provider-facing model, streaming, and capability layer for celadon.
//!
//! ```rust
//! use cprovider::{Message, ModelRequest, ProviderCapabilities, Role};
//!
//! let provider = ProviderCapabilities::detect("https://openrouter.ai/api/v1");
//! let model = ProviderCapabilities::best_tool_model(provider);
//! let request = ModelRequest::new(model, vec![Message::new(Role::User, "hi")]);
//!
//! assert_eq!(request.model, "openai/gpt-4o-mini");
//! assert!(request.validate().is_ok());
//! ```

pub mod accumulator;
pub mod adapters;
pub mod capability;
pub mod catalog;
pub mod credentials;
pub mod error;
pub mod model;
pub mod prelude;
pub mod provider;
pub mod resilience;
pub mod stream;

pub use accumulator::{MAX_TOOL_CALL_SLOTS, StreamAccumulator, StreamChunk, StreamCompletion};
pub use capability::{ProviderCapabilities, ProviderCapability};
pub use catalog::{
    DEFAULT_LISTING_TIMEOUT, ListingSource, ModelCatalog, ModelInfo, ModelListing,
    format_model_list, sort_tool_capable_first,
};
pub use credentials::{SecretString, SecureCredentialManager};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    FinishReason, Message, ModelRequest, ModelRequestBuilder, ProviderId, Role, TokenUsage,
    ToolCall, ToolDefinition,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use resilience::{
    NoopOperationHooks, ProviderOperation, ProviderOperationHooks, RetryPolicy,
    execute_with_retry,
};
pub use stream::{
    BoxedEventStream, ModelEventStream, StreamEvent, ToolCallFragment, VecEventStream,
};

#[cfg(feature = "provider-openai-compat")]
pub use adapters::openai_compat;
