//! Reassembly of streamed text and index-fragmented tool calls.
//!
//! Text deltas pass straight through as chunks. Tool-call fragments are merged by
//! index and only become visible once the stream delivers its terminal signal.
//!
//! ```rust
//! use cprovider::{FinishReason, StreamAccumulator, StreamEvent, ToolCallFragment};
//!
//! let mut accumulator = StreamAccumulator::new();
//! accumulator
//!     .feed(StreamEvent::ToolCallFragment(
//!         ToolCallFragment::at(0).with_id("call_1").with_name("generate_uuid"),
//!     ))
//!     .expect("fragment accepted");
//! accumulator
//!     .feed(StreamEvent::ToolCallFragment(ToolCallFragment::at(0).with_arguments("{}")))
//!     .expect("fragment accepted");
//!
//! let last = accumulator
//!     .feed(StreamEvent::Finish(FinishReason::ToolCalls))
//!     .expect("finish accepted")
//!     .expect("finish emits the final chunk");
//!
//! assert!(last.is_final);
//! assert_eq!(last.tool_calls[0].name, "generate_uuid");
//! assert_eq!(last.tool_calls[0].arguments, "{}");
//! ```

use crate::{FinishReason, ProviderError, StreamEvent, TokenUsage, ToolCall, ToolCallFragment};

/// Upper bound on tool-call slots in one turn, placeholders included.
///
/// Indices come from the backend; anything at or past this is a protocol error.
pub const MAX_TOOL_CALL_SLOTS: usize = 128;

/// One unit of streamed output delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamChunk {
    /// Text delta carried by this chunk. Empty on the final chunk.
    pub content: String,
    pub is_first: bool,
    pub is_final: bool,
    pub finish_reason: Option<FinishReason>,
    /// Finalized tool calls in index order. Only populated on the final chunk.
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<TokenUsage>,
}

/// Everything a finished stream produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCompletion {
    pub content: String,
    pub finish_reason: FinishReason,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<TokenUsage>,
}

/// Single-writer accumulator for one streamed turn.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    tool_calls: Vec<ToolCall>,
    usage: Option<TokenUsage>,
    emitted_first: bool,
    completion: Option<StreamCompletion>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one stream event, returning a chunk when the caller has something to show.
    ///
    /// Feeding after the terminal signal fails with a protocol error.
    pub fn feed(&mut self, event: StreamEvent) -> Result<Option<StreamChunk>, ProviderError> {
        if self.completion.is_some() {
            return Err(ProviderError::protocol(
                "stream event received after the turn was finalized",
            ));
        }

        match event {
            StreamEvent::TextDelta(delta) => {
                if delta.is_empty() {
                    return Ok(None);
                }

                self.content.push_str(&delta);
                Ok(Some(StreamChunk {
                    content: delta,
                    is_first: self.take_first(),
                    ..StreamChunk::default()
                }))
            }
            StreamEvent::ToolCallFragment(fragment) => {
                self.merge_fragment(fragment)?;
                Ok(None)
            }
            StreamEvent::Usage(usage) => {
                self.usage = Some(usage);
                Ok(None)
            }
            StreamEvent::Finish(reason) => Ok(Some(self.finalize(reason))),
        }
    }

    /// Finalizes a stream that ended without a terminal signal, as `stop`.
    pub fn finish(&mut self) -> Result<StreamChunk, ProviderError> {
        if self.completion.is_some() {
            return Err(ProviderError::protocol("stream was already finalized"));
        }

        Ok(self.finalize(FinishReason::Stop))
    }

    pub fn is_finished(&self) -> bool {
        self.completion.is_some()
    }

    /// Text collected so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of tool-call slots currently allocated, placeholders included.
    pub fn pending_tool_calls(&self) -> usize {
        self.tool_calls.len()
    }

    pub fn completion(&self) -> Option<&StreamCompletion> {
        self.completion.as_ref()
    }

    pub fn into_completion(self) -> Option<StreamCompletion> {
        self.completion
    }

    fn take_first(&mut self) -> bool {
        !std::mem::replace(&mut self.emitted_first, true)
    }

    fn merge_fragment(&mut self, fragment: ToolCallFragment) -> Result<(), ProviderError> {
        let ToolCallFragment {
            index,
            id,
            name,
            arguments,
        } = fragment;

        let slot_index = index.unwrap_or(self.tool_calls.len());
        if slot_index >= MAX_TOOL_CALL_SLOTS {
            return Err(ProviderError::protocol(format!(
                "tool call index {slot_index} exceeds the limit of {MAX_TOOL_CALL_SLOTS} calls per turn"
            )));
        }

        let Some(index) = index else {
            match id.filter(|id| !id.is_empty()) {
                Some(id) => self.tool_calls.push(ToolCall {
                    id,
                    name: name.unwrap_or_default(),
                    arguments: arguments.unwrap_or_default(),
                }),
                None => tracing::warn!(
                    event = "tool_fragment_dropped",
                    "tool call fragment carried neither an index nor an id"
                ),
            }
            return Ok(());
        };

        if index >= self.tool_calls.len() {
            self.tool_calls.resize_with(index + 1, ToolCall::default);
        }

        let slot = &mut self.tool_calls[index];
        if let Some(id) = id.filter(|value| !value.is_empty()) {
            slot.id = id;
        }
        if let Some(name) = name.filter(|value| !value.is_empty()) {
            slot.name = name;
        }
        if let Some(arguments) = arguments {
            slot.arguments.push_str(&arguments);
        }
        Ok(())
    }

    fn finalize(&mut self, reason: FinishReason) -> StreamChunk {
        let tool_calls = std::mem::take(&mut self.tool_calls);
        self.completion = Some(StreamCompletion {
            content: self.content.clone(),
            finish_reason: reason,
            tool_calls: tool_calls.clone(),
            usage: self.usage,
        });

        StreamChunk {
            content: String::new(),
            is_first: self.take_first(),
            is_final: true,
            finish_reason: Some(reason),
            tool_calls,
            usage: self.usage,
        }
    }
}
