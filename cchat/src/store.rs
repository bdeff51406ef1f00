//! Conversation storage contracts and a basic in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use ccommon::BoxFuture;
use cprovider::Message;

use crate::ChatError;

pub type ChatFuture<'a, T> = BoxFuture<'a, T>;

/// Holds committed conversation history. Turns are appended whole, after they succeed.
pub trait ConversationStore: Send + Sync {
    fn load_messages<'a>(
        &'a self,
        session_id: &'a str,
    ) -> ChatFuture<'a, Result<Vec<Message>, ChatError>>;

    fn append_messages<'a>(
        &'a self,
        session_id: &'a str,
        messages: Vec<Message>,
    ) -> ChatFuture<'a, Result<(), ChatError>>;

    fn clear<'a>(&'a self, session_id: &'a str) -> ChatFuture<'a, Result<(), ChatError>>;
}

#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    sessions: Mutex<HashMap<String, Vec<Message>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Message>>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|_| ChatError::store("conversation store lock poisoned"))
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn load_messages<'a>(
        &'a self,
        session_id: &'a str,
    ) -> ChatFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async move { Ok(self.sessions()?.get(session_id).cloned().unwrap_or_default()) })
    }

    fn append_messages<'a>(
        &'a self,
        session_id: &'a str,
        messages: Vec<Message>,
    ) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            self.sessions()?
                .entry(session_id.to_string())
                .or_default()
                .extend(messages);

            Ok(())
        })
    }

    fn clear<'a>(&'a self, session_id: &'a str) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            self.sessions()?.remove(session_id);
            Ok(())
        })
    }
}
