//! Skill errors and their model-legible payload form.
//!
//! ```rust
//! use cskills::SkillError;
//!
//! let error = SkillError::invalid_arguments("Zip code must be exactly 5 digits")
//!     .with_hint("Please provide a valid 5-digit US zip code")
//!     .with_context("field", "zip_code")
//!     .with_skill_name("get_weather");
//!
//! let payload = error.to_model_payload();
//! assert_eq!(payload["error"], true);
//! assert_eq!(payload["error_type"], "validation_error");
//! assert_eq!(payload["field"], "zip_code");
//! assert_eq!(payload["skill"], "get_weather");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillErrorKind {
    NotFound,
    NoHandler,
    InvalidArguments,
    Configuration,
    Execution,
    Network,
    Upstream,
    Timeout,
    Cancelled,
    Storage,
    Other,
}

impl SkillErrorKind {
    /// The `error_type` string reported to the model.
    pub fn error_type(self) -> &'static str {
        match self {
            Self::NotFound => "skill_not_found",
            Self::NoHandler => "no_handler",
            Self::InvalidArguments => "validation_error",
            Self::Configuration => "config_error",
            Self::Execution => "execution_error",
            Self::Network => "network_error",
            Self::Upstream => "api_error",
            Self::Timeout => "timeout_error",
            Self::Cancelled => "cancelled",
            Self::Storage => "storage_error",
            Self::Other => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillError {
    pub kind: SkillErrorKind,
    pub message: String,
    pub hint: Option<String>,
    /// Extra fields flattened into the top level of the model payload.
    pub context: Map<String, Value>,
    pub skill_name: Option<String>,
    pub tool_call_id: Option<String>,
}

impl SkillError {
    pub fn new(kind: SkillErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            hint: None,
            context: Map::new(),
            skill_name: None,
            tool_call_id: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::NotFound, message)
    }

    pub fn no_handler(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::NoHandler, message)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::InvalidArguments, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::Configuration, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::Execution, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::Network, message)
    }

    /// A remote service answered, but not with something usable.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::Upstream, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::Timeout, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::Cancelled, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::Storage, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(SkillErrorKind::Other, message)
    }

    /// A required setting was neither passed as an argument nor configured as a default.
    pub fn missing_setting(skill: &str, field: &str, config_command: &str) -> Self {
        Self::configuration(format!(
            "{field} is required for {skill}. Please provide {field} in your request, or set a default using: {config_command}"
        ))
        .with_hint(format!("You can ask the user for their {field} or location"))
        .with_context("skill", skill)
        .with_context("field", field)
        .with_context("config_command", config_command)
        .with_context(
            "info",
            format!("No default {field} configured. User must provide {field} in request."),
        )
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_skill_name(mut self, skill_name: impl Into<String>) -> Self {
        self.skill_name = Some(skill_name.into());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            SkillErrorKind::Timeout | SkillErrorKind::Network | SkillErrorKind::Upstream
        )
    }

    /// Errors the model can fix by changing its request or asking the user.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            SkillErrorKind::NotFound
                | SkillErrorKind::NoHandler
                | SkillErrorKind::InvalidArguments
                | SkillErrorKind::Configuration
        )
    }

    /// Builds `{error: true, error_type, message, hint?, ...context}`.
    ///
    /// Context keys never replace the three reserved fields.
    pub fn to_model_payload(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("error".to_string(), Value::Bool(true));
        payload.insert(
            "error_type".to_string(),
            Value::String(self.kind.error_type().to_string()),
        );
        payload.insert("message".to_string(), Value::String(self.message.clone()));
        if let Some(hint) = &self.hint {
            payload.insert("hint".to_string(), Value::String(hint.clone()));
        }
        if let Some(skill_name) = &self.skill_name {
            payload.insert("skill".to_string(), Value::String(skill_name.clone()));
        }

        for (key, value) in &self.context {
            if matches!(key.as_str(), "error" | "error_type" | "message") {
                continue;
            }
            payload.insert(key.clone(), value.clone());
        }

        Value::Object(payload)
    }
}

impl Display for SkillError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.skill_name, &self.tool_call_id) {
            (Some(skill_name), Some(tool_call_id)) => write!(
                f,
                "{:?} [skill={}, call_id={}]: {}",
                self.kind, skill_name, tool_call_id, self.message
            ),
            (Some(skill_name), None) => {
                write!(f, "{:?} [skill={}]: {}", self.kind, skill_name, self.message)
            }
            _ => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for SkillError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_setting_matches_configuration_payload_shape() {
        let payload = SkillError::missing_setting(
            "get_weather",
            "zip_code",
            "celadon config --set-weather-zip <zip>",
        )
        .to_model_payload();

        assert_eq!(payload["error"], true);
        assert_eq!(payload["error_type"], "config_error");
        assert_eq!(
            payload["message"],
            "zip_code is required for get_weather. Please provide zip_code in your request, or set a default using: celadon config --set-weather-zip <zip>"
        );
        assert_eq!(
            payload["hint"],
            "You can ask the user for their zip_code or location"
        );
        assert_eq!(payload["skill"], "get_weather");
        assert_eq!(payload["field"], "zip_code");
        assert_eq!(
            payload["config_command"],
            "celadon config --set-weather-zip <zip>"
        );
        assert_eq!(
            payload["info"],
            "No default zip_code configured. User must provide zip_code in request."
        );
    }

    #[test]
    fn context_cannot_shadow_reserved_fields() {
        let payload = SkillError::execution("boom")
            .with_context("message", "replaced")
            .with_context("error", false)
            .to_model_payload();

        assert_eq!(payload["message"], "boom");
        assert_eq!(payload["error"], true);
        assert!(payload.get("hint").is_none());
    }

    #[test]
    fn display_includes_skill_and_call_id() {
        let rendered = SkillError::timeout("slow")
            .with_skill_name("get_weather")
            .with_tool_call_id("call_7")
            .to_string();

        assert!(rendered.contains("get_weather"));
        assert!(rendered.contains("call_7"));
        assert!(SkillError::timeout("slow").is_retryable());
        assert!(SkillError::configuration("x").is_user_error());
    }
}
