use std::time::Duration;

use cprovider::ToolCall;

use crate::{ChatError, ChatTurnRequest, ChatTurnResult};

pub trait ChatTurnHooks: Send + Sync {
    fn on_turn_start(&self, _request: &ChatTurnRequest) {}

    fn on_tool_round_start(&self, _session_id: &str, _round: usize, _tool_calls: &[ToolCall]) {}

    fn on_tool_round_limit(&self, _session_id: &str, _max_rounds: usize) {}

    fn on_turn_success(&self, _result: &ChatTurnResult, _elapsed: Duration) {}

    fn on_turn_failure(&self, _session_id: &str, _error: &ChatError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatTurnHooks;

impl ChatTurnHooks for NoopChatTurnHooks {}
