//! Lifecycle hooks for skill execution.
//!
//! ```rust
//! use cskills::{NoopSkillExecutionHooks, SkillExecutionHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn SkillExecutionHooks) {}
//!
//! assert_hooks_trait(&NoopSkillExecutionHooks);
//! ```

use std::time::Duration;

use cprovider::ToolCall;

use crate::{SkillContext, SkillError, SkillOutput};

pub trait SkillExecutionHooks: Send + Sync {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &SkillContext) {}

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &SkillContext,
        _output: &SkillOutput,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &SkillContext,
        _error: &SkillError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSkillExecutionHooks;

impl SkillExecutionHooks for NoopSkillExecutionHooks {}
