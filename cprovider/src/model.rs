//! Provider-agnostic request and message model types.
//!
//! ```rust
//! use cprovider::{Message, ModelRequest, ProviderErrorKind, Role};
//!
//! let ok = ModelRequest::new_validated(
//!     "gpt-4o-mini",
//!     vec![Message::new(Role::User, "What's the weather like?")],
//! );
//! assert!(ok.is_ok());
//!
//! let err = ModelRequest::new_validated("", vec![Message::new(Role::User, "hi")])
//!     .err()
//!     .expect("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};

use ccommon::{GenerationOptions, MetadataMap};

use crate::{ProviderError, ProviderErrorKind};

/// Known chat backends. `Unknown` covers any endpoint the capability table cannot classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    OpenAi,
    Grok,
    Venice,
    Anthropic,
    Gemini,
    Vertex,
    OpenRouter,
    DigitalOcean,
    ElevenLabs,
    Unknown,
}

impl ProviderId {
    pub const KNOWN: [ProviderId; 9] = [
        Self::OpenAi,
        Self::Grok,
        Self::Venice,
        Self::Anthropic,
        Self::Gemini,
        Self::Vertex,
        Self::OpenRouter,
        Self::DigitalOcean,
        Self::ElevenLabs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Grok => "grok",
            Self::Venice => "venice",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Vertex => "vertex",
            Self::OpenRouter => "openrouter",
            Self::DigitalOcean => "digitalocean",
            Self::ElevenLabs => "elevenlabs",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a provider key; aliases are accepted, unrecognised keys yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "grok" | "xai" | "x.ai" => Some(Self::Grok),
            "venice" | "venice.ai" => Some(Self::Venice),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "gemini" | "google" | "aistudio" => Some(Self::Gemini),
            "vertex" | "vertexai" => Some(Self::Vertex),
            "openrouter" => Some(Self::OpenRouter),
            "digitalocean" | "do" | "gradient" => Some(Self::DigitalOcean),
            "elevenlabs" => Some(Self::ElevenLabs),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Calls requested by an assistant message.
    pub tool_calls: Vec<ToolCall>,
    /// Call answered by a tool message.
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema document describing the argument object.
    pub input_schema: String,
}

/// A complete tool invocation reconstructed from the stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// True for index slots that were padded but never received an id or name.
    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty() && self.name.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Cancelled,
    Other,
}

impl FinishReason {
    /// Maps a wire `finish_reason`; empty or absent values are not terminal and yield `None`.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("") => None,
            Some("stop") => Some(Self::Stop),
            Some("length") => Some(Self::Length),
            Some("tool_calls") | Some("function_call") => Some(Self::ToolCalls),
            Some("content_filter") => Some(Self::ContentFilter),
            Some("cancelled") => Some(Self::Cancelled),
            Some(_) => Some(Self::Other),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ToolCalls => "tool_calls",
            Self::ContentFilter => "content_filter",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        }
    }
}

impl Display for FinishReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: GenerationOptions,
    pub tools: Vec<ToolDefinition>,
    pub metadata: MetadataMap,
}

impl ModelRequest {
    pub fn builder(model: impl Into<String>) -> ModelRequestBuilder {
        ModelRequestBuilder::new(model)
    }

    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: GenerationOptions::default(),
            tools: Vec::new(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn new_validated(
        model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Result<Self, ProviderError> {
        let request = Self::new(model, messages);
        request.validate()?;
        Ok(request)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn enable_streaming(mut self) -> Self {
        self.options.stream = true;
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(max_tokens) = self.options.max_tokens
            && max_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::new(
                ProviderErrorKind::InvalidRequest,
                "temperature must be in the inclusive range 0.0..=2.0",
                false,
            ));
        }

        if let Some(orphan) = self
            .messages
            .iter()
            .find(|message| message.role == Role::Tool && message.tool_call_id.is_none())
        {
            return Err(ProviderError::invalid_request(format!(
                "tool message is missing tool_call_id: '{}'",
                orphan.content
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequestBuilder {
    model: String,
    messages: Vec<Message>,
    options: GenerationOptions,
    tools: Vec<ToolDefinition>,
    metadata: MetadataMap,
}

impl ModelRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            options: GenerationOptions::default(),
            tools: Vec::new(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.options.stream = stream;
        self
    }

    pub fn enable_streaming(self) -> Self {
        self.streaming(true)
    }

    pub fn build(self) -> Result<ModelRequest, ProviderError> {
        let request = ModelRequest {
            model: self.model,
            messages: self.messages,
            options: self.options,
            tools: self.tools,
            metadata: self.metadata,
        };

        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_parse_accepts_aliases_and_round_trips() {
        for id in ProviderId::KNOWN {
            assert_eq!(ProviderId::parse(id.as_str()), Some(id));
        }

        assert_eq!(ProviderId::parse("Claude"), Some(ProviderId::Anthropic));
        assert_eq!(ProviderId::parse(" xai "), Some(ProviderId::Grok));
        assert_eq!(ProviderId::parse("mystery"), None);
    }

    #[test]
    fn finish_reason_parse_treats_empty_as_non_terminal() {
        assert_eq!(FinishReason::parse(None), None);
        assert_eq!(FinishReason::parse(Some("")), None);
        assert_eq!(FinishReason::parse(Some("stop")), Some(FinishReason::Stop));
        assert_eq!(
            FinishReason::parse(Some("tool_calls")),
            Some(FinishReason::ToolCalls)
        );
        assert_eq!(
            FinishReason::parse(Some("something_new")),
            Some(FinishReason::Other)
        );
    }

    #[test]
    fn builder_rejects_tool_message_without_call_id() {
        let mut orphan = Message::new(Role::Tool, "{\"ok\":true}");
        orphan.tool_call_id = None;

        let error = ModelRequest::builder("gpt-4o-mini")
            .message(Message::new(Role::User, "hi"))
            .message(orphan)
            .build()
            .expect_err("orphan tool message should fail");

        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn builder_accepts_tool_round_trip_transcript() {
        let call = ToolCall::new("call_1", "generate_uuid", "{}");
        let request = ModelRequest::builder("gpt-4o-mini")
            .message(Message::new(Role::User, "give me an id"))
            .message(Message::assistant_with_tool_calls("", vec![call]))
            .message(Message::tool_result("call_1", "{\"uuid\":\"x\"}"))
            .enable_streaming()
            .build()
            .expect("request should build");

        assert!(request.options.stream);
        assert!(request.messages[1].has_tool_calls());
        assert_eq!(request.messages[2].tool_call_id.as_deref(), Some("call_1"));
    }
}
