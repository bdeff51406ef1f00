//! Skill layer for celadon: definitions, handlers, registry, and execution.
//!
//! ```rust
//! use cskills::{SkillDefinition, SkillOutput, SkillRegistry};
//!
//! let registry = SkillRegistry::new();
//! registry
//!     .register_skill(SkillDefinition::without_parameters("ping", "Replies with pong"))
//!     .expect("definition is valid");
//! registry.register_sync_fn("ping", |_args, _ctx| Ok(SkillOutput::from("pong")));
//!
//! assert!(registry.has_handler("ping"));
//! assert_eq!(registry.tool_definitions()[0].name, "ping");
//! ```

pub mod builtin;

mod args;
mod config;
mod definition;
mod error;
mod executor;
mod handler;
mod hooks;
mod registry;
mod types;

pub mod prelude {
    pub use crate::{
        ExecutionResult, SkillArgs, SkillConfigSource, SkillContext, SkillDefinition, SkillError,
        SkillErrorKind, SkillExecutor, SkillHandler, SkillOutcome, SkillOutput, SkillRegistry,
        SkillRuntime,
    };
}

pub use args::{ArgumentValidation, SkillArgs};
pub use config::{
    ENV_PREFIX, EnvSkillConfig, SkillConfigSection, SkillConfigSource, StaticSkillConfig,
};
pub use definition::SkillDefinition;
pub use error::{SkillError, SkillErrorKind};
pub use executor::{DEFAULT_SKILL_TIMEOUT, SkillExecutor, SkillRuntime};
pub use handler::{FunctionHandler, SkillFuture, SkillHandler};
pub use hooks::{NoopSkillExecutionHooks, SkillExecutionHooks};
pub use registry::{LoadFailure, LoadReport, SkillRegistry};
pub use types::{ExecutionResult, SkillContext, SkillOutcome, SkillOutput};
