//! Provider failures, tagged with whether a retry could help.
//!
//! ```rust
//! use cprovider::{ProviderError, ProviderErrorKind};
//!
//! let throttled = ProviderError::from_status(429, "slow down");
//! assert_eq!(throttled.kind, ProviderErrorKind::RateLimited);
//! assert!(throttled.retryable);
//!
//! let broken = ProviderError::protocol("event after finish");
//! assert_eq!(broken.to_string(), "Protocol: event after finish");
//! assert!(!broken.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use ccommon::Elapsed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Missing or rejected API key (401/403).
    Authentication,
    RateLimited,
    /// The backend refused the request shape: unknown model, bad tool schema, oversized context.
    InvalidRequest,
    Timeout,
    /// Connection-level failure, or a status with no better classification.
    Transport,
    Unavailable,
    /// The backend broke the streaming contract (bad payload, event after finish).
    Protocol,
    Cancelled,
    Other,
}

impl ProviderErrorKind {
    /// Kinds that can clear up on their own if the same request is sent again.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::Transport | Self::Unavailable
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    fn of_kind(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, kind.is_transient())
    }

    /// Classifies a non-success HTTP status from a chat backend.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Authentication,
            429 => ProviderErrorKind::RateLimited,
            408 | 504 => ProviderErrorKind::Timeout,
            400 | 404 | 413 | 422 => ProviderErrorKind::InvalidRequest,
            502 | 503 => ProviderErrorKind::Unavailable,
            _ => ProviderErrorKind::Transport,
        };
        Self::of_kind(kind, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Authentication, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::InvalidRequest, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Transport, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Unavailable, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Protocol, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Cancelled, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::of_kind(ProviderErrorKind::Other, message)
    }
}

impl From<Elapsed> for ProviderError {
    fn from(elapsed: Elapsed) -> Self {
        Self::timeout(elapsed.to_string())
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ProviderError {}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn backend_statuses_map_to_kinds_and_retryability() {
        let cases = [
            (401, ProviderErrorKind::Authentication, false),
            (403, ProviderErrorKind::Authentication, false),
            (413, ProviderErrorKind::InvalidRequest, false),
            (429, ProviderErrorKind::RateLimited, true),
            (408, ProviderErrorKind::Timeout, true),
            (503, ProviderErrorKind::Unavailable, true),
            (500, ProviderErrorKind::Transport, true),
        ];

        for (status, kind, retryable) in cases {
            let error = ProviderError::from_status(status, "backend said no");
            assert_eq!(error.kind, kind, "{status}");
            assert_eq!(error.retryable, retryable, "{status}");
        }
    }

    #[test]
    fn elapsed_deadlines_become_retryable_timeouts() {
        let error = ProviderError::from(Elapsed {
            after: Duration::from_millis(1500),
        });
        assert_eq!(error.kind, ProviderErrorKind::Timeout);
        assert!(error.retryable);
        assert_eq!(error.message, "deadline of 1500ms elapsed");
    }
}
