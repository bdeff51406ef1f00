//! Errors raised while assembling a runtime.

use std::error::Error;
use std::fmt::{Display, Formatter};

use cprovider::ProviderError;
use cskills::SkillError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    Configuration,
    Provider,
    Skills,
    ModelSelection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::Configuration, message)
    }

    pub fn model_selection(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::ModelSelection, message)
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for RuntimeError {}

impl From<ProviderError> for RuntimeError {
    fn from(value: ProviderError) -> Self {
        Self::new(RuntimeErrorKind::Provider, value.to_string())
    }
}

impl From<SkillError> for RuntimeError {
    fn from(value: SkillError) -> Self {
        Self::new(RuntimeErrorKind::Skills, value.to_string())
    }
}
