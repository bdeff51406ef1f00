//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use cprovider::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Transport,
    Store,
    Cancelled,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    /// Set when the failure came from the provider layer.
    pub provider_kind: Option<ProviderErrorKind>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider_kind: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Transport, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Cancelled, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Timeout, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.provider_kind
            .is_some_and(ProviderErrorKind::is_transient)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.provider_kind {
            Some(provider_kind) => write!(
                f,
                "{:?}: {} [provider={:?}]",
                self.kind, self.message, provider_kind
            ),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        let kind = match value.kind {
            ProviderErrorKind::InvalidRequest => ChatErrorKind::InvalidRequest,
            ProviderErrorKind::Cancelled => ChatErrorKind::Cancelled,
            _ => ChatErrorKind::Transport,
        };

        Self {
            kind,
            message: value.message,
            provider_kind: Some(value.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_collapse_to_transport_unless_caller_facing() {
        let transport = ChatError::from(ProviderError::rate_limited("slow down"));
        assert_eq!(transport.kind, ChatErrorKind::Transport);
        assert!(transport.is_retryable());
        assert_eq!(transport.to_string(), "Transport: slow down [provider=RateLimited]");

        let invalid = ChatError::from(ProviderError::invalid_request("model must not be empty"));
        assert_eq!(invalid.kind, ChatErrorKind::InvalidRequest);
        assert!(!invalid.is_retryable());

        let cancelled = ChatError::from(ProviderError::cancelled("stopped"));
        assert_eq!(cancelled.kind, ChatErrorKind::Cancelled);
    }
}
