//! Adapter-level request/chunk types and their mapping to the shared model.

use std::fmt::Formatter;

use crate::{
    FinishReason, Message, ModelRequest, Role, SecretString, StreamEvent, TokenUsage, ToolCall,
    ToolCallFragment, ToolDefinition,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiCompatRequest {
    pub model: String,
    pub messages: Vec<OpenAiCompatMessage>,
    pub tools: Vec<OpenAiCompatTool>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the backend for a trailing usage block.
    pub include_usage: bool,
}

impl OpenAiCompatRequest {
    pub(crate) fn from_model_request(request: ModelRequest, include_usage: bool) -> Self {
        Self {
            model: request.model,
            messages: request
                .messages
                .into_iter()
                .map(OpenAiCompatMessage::from)
                .collect(),
            tools: request
                .tools
                .into_iter()
                .map(OpenAiCompatTool::from)
                .collect(),
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
            include_usage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiCompatMessage {
    pub role: Role,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub tool_call_id: Option<String>,
}

impl OpenAiCompatMessage {
    /// Empty messages carry nothing for the backend unless they answer or request a tool call.
    pub(crate) fn is_sendable(&self) -> bool {
        !self.content.trim().is_empty()
            || !self.tool_calls.is_empty()
            || self.tool_call_id.is_some()
    }
}

impl From<Message> for OpenAiCompatMessage {
    fn from(value: Message) -> Self {
        Self {
            role: value.role,
            content: value.content,
            tool_calls: value.tool_calls,
            tool_call_id: value.tool_call_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiCompatTool {
    pub name: String,
    pub description: String,
    pub input_schema: String,
}

impl From<ToolDefinition> for OpenAiCompatTool {
    fn from(value: ToolDefinition) -> Self {
        Self {
            name: value.name,
            description: value.description,
            input_schema: value.input_schema,
        }
    }
}

/// Bearer credential sent with each request; `None` for keyless endpoints.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct OpenAiCompatAuth {
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for OpenAiCompatAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.api_key {
            Some(_) => f.write_str("OpenAiCompatAuth::Bearer([REDACTED])"),
            None => f.write_str("OpenAiCompatAuth::None"),
        }
    }
}

/// One decoded piece of a streamed completion, before it reaches the accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiCompatChunk {
    ContentDelta(String),
    ToolCallDelta {
        index: Option<usize>,
        id: Option<String>,
        name: Option<String>,
        arguments: Option<String>,
    },
    Usage(TokenUsage),
    Finish(FinishReason),
}

impl From<OpenAiCompatChunk> for StreamEvent {
    fn from(value: OpenAiCompatChunk) -> Self {
        match value {
            OpenAiCompatChunk::ContentDelta(delta) => Self::TextDelta(delta),
            OpenAiCompatChunk::ToolCallDelta {
                index,
                id,
                name,
                arguments,
            } => Self::ToolCallFragment(ToolCallFragment {
                index,
                id,
                name,
                arguments,
            }),
            OpenAiCompatChunk::Usage(usage) => Self::Usage(usage),
            OpenAiCompatChunk::Finish(reason) => Self::Finish(reason),
        }
    }
}
