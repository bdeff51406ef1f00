//! Chat-completions wire payloads, SSE framing, and chunk decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FinishReason, ProviderError, Role, TokenUsage};

use super::types::{OpenAiCompatChunk, OpenAiCompatMessage, OpenAiCompatRequest, OpenAiCompatTool};

pub(crate) fn build_api_request(
    request: OpenAiCompatRequest,
) -> Result<OpenAiApiRequest, ProviderError> {
    let messages = request
        .messages
        .into_iter()
        .filter(OpenAiCompatMessage::is_sendable)
        .map(OpenAiApiMessage::from)
        .collect::<Vec<_>>();

    if messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "chat request requires at least one non-empty message",
        ));
    }

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(
            request
                .tools
                .into_iter()
                .map(OpenAiApiTool::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    Ok(OpenAiApiRequest {
        model: request.model,
        messages,
        tools,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        stream: true,
        stream_options: request
            .include_usage
            .then_some(OpenAiApiStreamOptions { include_usage: true }),
    })
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<OpenAiApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

/// Decodes one SSE `data:` payload into chunks, in wire order.
///
/// Only the first choice is read. Its finish reason, if any, comes last.
pub(crate) fn decode_stream_payload(payload: &str) -> Result<Vec<OpenAiCompatChunk>, ProviderError> {
    let parsed: OpenAiApiStreamResponse = serde_json::from_str(payload).map_err(|err| {
        ProviderError::protocol(format!("malformed stream payload: {err}"))
    })?;

    let mut chunks = Vec::new();

    if let Some(choice) = parsed.choices.into_iter().next() {
        if let Some(content) = choice.delta.content
            && !content.is_empty()
        {
            chunks.push(OpenAiCompatChunk::ContentDelta(content));
        }

        for call in choice.delta.tool_calls.unwrap_or_default() {
            let (name, arguments) = match call.function {
                Some(function) => (function.name, function.arguments),
                None => (None, None),
            };
            chunks.push(OpenAiCompatChunk::ToolCallDelta {
                index: call.index,
                id: call.id,
                name,
                arguments,
            });
        }

        if let Some(reason) = FinishReason::parse(choice.finish_reason.as_deref()) {
            chunks.push(OpenAiCompatChunk::Finish(reason));
        }
    }

    if let Some(usage) = parsed.usage {
        chunks.push(OpenAiCompatChunk::Usage(usage.into()));
    }

    Ok(chunks)
}

pub(crate) fn decode_model_listing(body: &str) -> Result<Vec<String>, ProviderError> {
    let parsed: OpenAiApiModelList = serde_json::from_str(body)
        .map_err(|err| ProviderError::protocol(format!("malformed model listing: {err}")))?;

    Ok(parsed.data.into_iter().map(|model| model.id).collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SseFrame {
    Data(String),
    Done,
}

/// Line-oriented SSE framing over raw body bytes.
///
/// Bytes are buffered until a full line is available, so multi-byte characters
/// split across network reads decode correctly.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseFrame>, ProviderError> {
        self.buffer.extend_from_slice(bytes);
        let mut frames = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line = self.buffer.drain(..=newline).collect::<Vec<_>>();
            if let Some(frame) = Self::frame(&line)? {
                frames.push(frame);
            }
        }

        Ok(frames)
    }

    /// Flushes a trailing line that arrived without a newline.
    pub(crate) fn finish(&mut self) -> Result<Option<SseFrame>, ProviderError> {
        let line = std::mem::take(&mut self.buffer);
        Self::frame(&line)
    }

    fn frame(line: &[u8]) -> Result<Option<SseFrame>, ProviderError> {
        let line = std::str::from_utf8(line)
            .map_err(|err| ProviderError::protocol(format!("stream is not UTF-8: {err}")))?
            .trim();

        let Some(payload) = line.strip_prefix("data:") else {
            return Ok(None);
        };

        let payload = payload.trim();
        if payload.is_empty() {
            return Ok(None);
        }

        if payload == "[DONE]" {
            return Ok(Some(SseFrame::Done));
        }

        Ok(Some(SseFrame::Data(payload.to_string())))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiErrorEnvelope {
    pub error: OpenAiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<OpenAiApiStreamOptions>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiStreamOptions {
    pub include_usage: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: &'static str,
    /// `null` only for an assistant message that carries nothing but tool calls.
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl From<OpenAiCompatMessage> for OpenAiApiMessage {
    fn from(value: OpenAiCompatMessage) -> Self {
        let tool_calls = (value.role == Role::Assistant && !value.tool_calls.is_empty()).then(|| {
            value
                .tool_calls
                .into_iter()
                .map(|call| OpenAiApiToolCall {
                    id: call.id,
                    r#type: "function",
                    function: OpenAiApiToolFunction {
                        name: call.name,
                        arguments: call.arguments,
                    },
                })
                .collect()
        });

        let content = if tool_calls.is_some() && value.content.is_empty() {
            None
        } else {
            Some(value.content)
        };

        Self {
            role: value.role.as_str(),
            content,
            tool_calls,
            tool_call_id: value.tool_call_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiToolCall {
    pub id: String,
    pub r#type: &'static str,
    pub function: OpenAiApiToolFunction,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiToolFunction {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiTool {
    pub r#type: &'static str,
    pub function: OpenAiApiFunction,
}

impl TryFrom<OpenAiCompatTool> for OpenAiApiTool {
    type Error = ProviderError;

    fn try_from(value: OpenAiCompatTool) -> Result<Self, Self::Error> {
        let parameters = serde_json::from_str::<Value>(&value.input_schema).map_err(|_| {
            ProviderError::invalid_request(format!(
                "tool '{}' parameter schema must be valid JSON",
                value.name
            ))
        })?;

        Ok(Self {
            r#type: "function",
            function: OpenAiApiFunction {
                name: value.name,
                description: value.description,
                parameters,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiStreamResponse {
    #[serde(default)]
    pub choices: Vec<OpenAiApiStreamChoice>,
    pub usage: Option<OpenAiApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiStreamChoice {
    #[serde(default)]
    pub delta: OpenAiApiStreamDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OpenAiApiStreamDelta {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<OpenAiApiDeltaToolCall>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiDeltaToolCall {
    pub index: Option<usize>,
    pub id: Option<String>,
    pub function: Option<OpenAiApiDeltaToolFunction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiDeltaToolFunction {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<OpenAiApiUsage> for TokenUsage {
    fn from(value: OpenAiApiUsage) -> Self {
        Self {
            input_tokens: value.prompt_tokens,
            output_tokens: value.completion_tokens,
            total_tokens: value.total_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiModelList {
    #[serde(default)]
    pub data: Vec<OpenAiApiModel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiModel {
    pub id: String,
}
