//! Conversation turns over a streaming provider, with skills run between rounds.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use cchat::{ChatPolicy, ChatSession, ChatTurnRequest, ToolOffer};
//! use cprovider::ProviderId;
//!
//! let session = ChatSession::new("session-1", ProviderId::OpenAi, "gpt-4o-mini")
//!     .with_system_prompt("You are terse.");
//! let request = ChatTurnRequest::new(session, "convert 5 km to miles")
//!     .with_deadline(Duration::from_secs(60));
//! let policy = ChatPolicy::default().with_tool_offer(ToolOffer::Auto);
//!
//! assert_eq!(policy.max_tool_round_trips, 4);
//! assert_eq!(request.deadline, Some(Duration::from_secs(60)));
//! ```

mod error;
mod hooks;
mod service;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatEvent, ChatEventObserver, ChatPolicy, ChatService,
        ChatServiceBuilder, ChatSession, ChatTurnRequest, ChatTurnResult, ConversationStore,
        InMemoryConversationStore, ToolOffer,
    };
    pub use ccommon::{MetadataMap, SessionId, TraceId};
    pub use tokio_util::sync::CancellationToken;
}

pub use error::{ChatError, ChatErrorKind};
pub use hooks::{ChatTurnHooks, NoopChatTurnHooks};
pub use service::{
    ChatPolicy, ChatService, ChatServiceBuilder, DEFAULT_MAX_TOOL_ROUND_TRIPS, ToolOffer,
};
pub use store::{ChatFuture, ConversationStore, InMemoryConversationStore};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    ChatEvent, ChatEventObserver, ChatSession, ChatTurnRequest, ChatTurnResult,
    NoopChatEventObserver,
};
