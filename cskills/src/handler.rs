//! Handler trait bound to skill names in the registry.
//!
//! ```rust
//! use cskills::{FunctionHandler, SkillArgs, SkillContext, SkillHandler, SkillOutput};
//!
//! let handler = FunctionHandler::from_sync(|args: SkillArgs, _ctx| {
//!     Ok(SkillOutput::from(format!("{} args", args.len())))
//! });
//!
//! let context = SkillContext::new("session-1");
//! let _future = handler.call(SkillArgs::new(), &context);
//! ```

use std::future::Future;
use std::sync::Arc;

use ccommon::BoxFuture;

use crate::{SkillArgs, SkillContext, SkillError, SkillOutput};

pub type SkillFuture<'a, T> = BoxFuture<'a, T>;

pub trait SkillHandler: Send + Sync {
    fn call<'a>(
        &'a self,
        args: SkillArgs,
        context: &'a SkillContext,
    ) -> SkillFuture<'a, Result<SkillOutput, SkillError>>;
}

type HandlerFn = dyn Fn(SkillArgs, SkillContext) -> SkillFuture<'static, Result<SkillOutput, SkillError>>
    + Send
    + Sync;

#[derive(Clone)]
pub struct FunctionHandler {
    handler: Arc<HandlerFn>,
}

impl FunctionHandler {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(SkillArgs, SkillContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SkillOutput, SkillError>> + Send + 'static,
    {
        let handler: Arc<HandlerFn> = Arc::new(move |args, context| Box::pin(handler(args, context)));
        Self { handler }
    }

    pub fn from_sync<F>(handler: F) -> Self
    where
        F: Fn(SkillArgs, SkillContext) -> Result<SkillOutput, SkillError> + Send + Sync + 'static,
    {
        Self::new(move |args, context| {
            let output = handler(args, context);
            async move { output }
        })
    }
}

impl std::fmt::Debug for FunctionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FunctionHandler")
    }
}

impl SkillHandler for FunctionHandler {
    fn call<'a>(
        &'a self,
        args: SkillArgs,
        context: &'a SkillContext,
    ) -> SkillFuture<'a, Result<SkillOutput, SkillError>> {
        (self.handler)(args, context.clone())
    }
}
