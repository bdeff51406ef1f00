//! Skill execution context, handler output, and execution results.

use std::time::Duration;

use ccommon::{MetadataMap, SessionId, TraceId};
use cprovider::{Message, ToolCall};
use serde_json::Value;

use crate::SkillError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillContext {
    pub session_id: SessionId,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
}

impl SkillContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// What a handler hands back on success.
#[derive(Debug, Clone, PartialEq)]
pub enum SkillOutput {
    Text(String),
    Json(Value),
}

impl SkillOutput {
    /// Text and JSON strings pass through verbatim; other JSON values are serialized.
    pub fn to_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(Value::String(text)) => text.clone(),
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<String> for SkillOutput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SkillOutput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Value> for SkillOutput {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkillOutcome {
    Success(SkillOutput),
    Failure(SkillError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub tool_call_id: String,
    pub skill_name: String,
    pub outcome: SkillOutcome,
    pub elapsed: Duration,
}

impl ExecutionResult {
    pub fn success(call: &ToolCall, output: SkillOutput, elapsed: Duration) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            skill_name: call.name.clone(),
            outcome: SkillOutcome::Success(output),
            elapsed,
        }
    }

    pub fn failure(call: &ToolCall, error: SkillError, elapsed: Duration) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            skill_name: call.name.clone(),
            outcome: SkillOutcome::Failure(error),
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, SkillOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&SkillError> {
        match &self.outcome {
            SkillOutcome::Failure(error) => Some(error),
            SkillOutcome::Success(_) => None,
        }
    }

    /// Conversation text for the tool message: the output, or the error payload as JSON.
    pub fn content(&self) -> String {
        match &self.outcome {
            SkillOutcome::Success(output) => output.to_content(),
            SkillOutcome::Failure(error) => error.to_model_payload().to_string(),
        }
    }

    pub fn to_message(&self) -> Message {
        Message::tool_result(self.tool_call_id.clone(), self.content())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_results_pass_through_and_objects_serialize() {
        assert_eq!(SkillOutput::from("plain").to_content(), "plain");
        assert_eq!(SkillOutput::Json(json!("quoted")).to_content(), "quoted");
        assert_eq!(
            SkillOutput::Json(json!({"uuid": "abc"})).to_content(),
            r#"{"uuid":"abc"}"#
        );
    }

    #[test]
    fn failures_render_as_error_payloads_in_tool_messages() {
        let call = ToolCall::new("call_1", "missing", "{}");
        let result = ExecutionResult::failure(
            &call,
            SkillError::not_found("skill not found: missing"),
            Duration::ZERO,
        );

        let message = result.to_message();
        assert_eq!(message.tool_call_id.as_deref(), Some("call_1"));
        let payload: Value = serde_json::from_str(&message.content).expect("payload json");
        assert_eq!(payload["error_type"], "skill_not_found");
        assert!(!result.is_success());
    }
}
