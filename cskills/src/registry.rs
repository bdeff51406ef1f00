//! Skill registry: definitions, bound handlers, and the on-disk skill directory.
//!
//! Definitions and handlers are independent: a definition loaded from disk has
//! no handler until one is bound by name, and calling it reports `NoHandler`.

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ccommon::Registry;
use cprovider::ToolDefinition;

use crate::definition::{file_name_for, validate_name};
use crate::{
    FunctionHandler, SkillArgs, SkillContext, SkillDefinition, SkillError, SkillHandler,
    SkillOutput,
};

#[derive(Default)]
pub struct SkillRegistry {
    skills: RwLock<Registry<String, SkillDefinition>>,
    handlers: RwLock<Registry<String, Arc<dyn SkillHandler>>>,
    skills_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: SkillError,
}

/// Outcome of scanning a skill directory; failures are per file.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that `save_skill` and `delete_skill` write through to.
    pub fn with_skills_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.skills_dir = Some(dir.into());
        self
    }

    pub fn skills_dir(&self) -> Option<&Path> {
        self.skills_dir.as_deref()
    }

    /// Replaces any existing definition with the same name.
    pub fn register_skill(&self, definition: SkillDefinition) -> Result<(), SkillError> {
        definition.validate()?;
        self.skills_mut().insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn register_handler<H>(&self, name: impl Into<String>, handler: H)
    where
        H: SkillHandler + 'static,
    {
        self.handlers_mut().insert(name.into(), Arc::new(handler));
    }

    pub fn register_fn<F, Fut>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(SkillArgs, SkillContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SkillOutput, SkillError>> + Send + 'static,
    {
        self.register_handler(name, FunctionHandler::new(handler));
    }

    pub fn register_sync_fn<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(SkillArgs, SkillContext) -> Result<SkillOutput, SkillError> + Send + Sync + 'static,
    {
        self.register_handler(name, FunctionHandler::from_sync(handler));
    }

    /// Registers a definition together with its handler.
    pub fn register<H>(&self, definition: SkillDefinition, handler: H) -> Result<(), SkillError>
    where
        H: SkillHandler + 'static,
    {
        let name = definition.name.clone();
        self.register_skill(definition)?;
        self.register_handler(name, handler);
        Ok(())
    }

    /// Loads every `*.json` file in `dir`; a bad file is reported and skipped.
    pub fn load_skills(&self, dir: impl AsRef<Path>) -> Result<LoadReport, SkillError> {
        let dir = dir.as_ref();
        let mut report = LoadReport::default();
        if !dir.is_dir() {
            tracing::debug!(event = "skills_dir_missing", path = %dir.display());
            return Ok(report);
        }

        let entries = std::fs::read_dir(dir).map_err(|err| {
            SkillError::storage(format!(
                "failed to list skills directory {}: {err}",
                dir.display()
            ))
        })?;

        let mut paths = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect::<Vec<_>>();
        paths.sort();

        for path in paths {
            match read_definition(&path).and_then(|definition| {
                let name = definition.name.clone();
                self.register_skill(definition)?;
                Ok(name)
            }) {
                Ok(name) => {
                    tracing::debug!(
                        event = "skill_loaded",
                        skill_name = %name,
                        path = %path.display()
                    );
                    report.loaded.push(name);
                }
                Err(error) => {
                    tracing::warn!(
                        event = "skill_load_failed",
                        path = %path.display(),
                        error = %error,
                        "skipping skill file"
                    );
                    report.failures.push(LoadFailure { path, error });
                }
            }
        }

        Ok(report)
    }

    /// Writes the definition file, then replaces the in-memory entry.
    pub fn save_skill(&self, definition: SkillDefinition) -> Result<PathBuf, SkillError> {
        definition.validate()?;
        let dir = self.require_skills_dir()?;

        std::fs::create_dir_all(dir).map_err(|err| {
            SkillError::storage(format!(
                "failed to create skills directory {}: {err}",
                dir.display()
            ))
        })?;

        let path = dir.join(definition.file_name());
        let body = definition.to_json_pretty()?;
        std::fs::write(&path, body).map_err(|err| {
            SkillError::storage(format!("failed to write skill file {}: {err}", path.display()))
                .with_skill_name(&definition.name)
        })?;

        self.skills_mut().insert(definition.name.clone(), definition);
        Ok(path)
    }

    /// Removes the skill file, then the definition and any bound handler.
    ///
    /// Returns whether anything existed to delete.
    pub fn delete_skill(&self, name: &str) -> Result<bool, SkillError> {
        validate_name(name)?;
        let dir = self.require_skills_dir()?;
        let path = dir.join(file_name_for(name));

        let removed_file = if path.is_file() {
            std::fs::remove_file(&path).map_err(|err| {
                SkillError::storage(format!(
                    "failed to delete skill file {}: {err}",
                    path.display()
                ))
                .with_skill_name(name)
            })?;
            true
        } else {
            false
        };

        let removed_skill = self.skills_mut().remove(name).is_some();
        self.handlers_mut().remove(name);
        Ok(removed_file || removed_skill)
    }

    pub fn get_skill(&self, name: &str) -> Option<SkillDefinition> {
        self.skills().get(name).cloned()
    }

    /// All definitions ordered by name.
    pub fn all_skills(&self) -> Vec<SkillDefinition> {
        self.skills().values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.skills().len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.skills().contains_key(name)
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers().contains_key(name)
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.all_skills()
            .iter()
            .map(SkillDefinition::to_tool_definition)
            .collect()
    }

    /// Resolves a name to its definition and handler without holding either lock afterwards.
    pub fn resolve(
        &self,
        name: &str,
    ) -> Result<(SkillDefinition, Arc<dyn SkillHandler>), SkillError> {
        let definition = self.get_skill(name).ok_or_else(|| {
            SkillError::not_found(format!("skill not found: {name}"))
                .with_hint("Use one of the skills offered in this conversation.")
                .with_skill_name(name)
        })?;

        let handler = self.handlers().get(name).cloned().ok_or_else(|| {
            SkillError::no_handler(format!("no handler for skill: {name}"))
                .with_hint("This skill is defined but cannot run in this session.")
                .with_skill_name(name)
        })?;

        Ok((definition, handler))
    }

    /// Runs the bound handler; its result or error is returned unmodified.
    pub async fn execute(
        &self,
        name: &str,
        args: SkillArgs,
        context: &SkillContext,
    ) -> Result<SkillOutput, SkillError> {
        let (_, handler) = self.resolve(name)?;
        handler.call(args, context).await
    }

    fn require_skills_dir(&self) -> Result<&Path, SkillError> {
        self.skills_dir
            .as_deref()
            .ok_or_else(|| SkillError::storage("no skills directory configured"))
    }

    fn skills(&self) -> RwLockReadGuard<'_, Registry<String, SkillDefinition>> {
        self.skills.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn skills_mut(&self) -> RwLockWriteGuard<'_, Registry<String, SkillDefinition>> {
        self.skills.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn handlers(&self) -> RwLockReadGuard<'_, Registry<String, Arc<dyn SkillHandler>>> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn handlers_mut(&self) -> RwLockWriteGuard<'_, Registry<String, Arc<dyn SkillHandler>>> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for SkillRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = self
            .all_skills()
            .into_iter()
            .map(|skill| skill.name)
            .collect::<Vec<_>>();
        f.debug_struct("SkillRegistry")
            .field("skills", &names)
            .field("skills_dir", &self.skills_dir)
            .finish()
    }
}

fn read_definition(path: &Path) -> Result<SkillDefinition, SkillError> {
    let body = std::fs::read_to_string(path).map_err(|err| {
        SkillError::storage(format!("failed to read skill file {}: {err}", path.display()))
    })?;
    SkillDefinition::from_json(&body)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::SkillErrorKind;

    fn echo_definition() -> SkillDefinition {
        SkillDefinition::new(
            "echo",
            "Echoes its text argument",
            json!({"type": "object", "properties": {"text": {"type": "string"}}, "required": ["text"]}),
        )
    }

    #[tokio::test]
    async fn execute_distinguishes_missing_skill_from_missing_handler() {
        let registry = SkillRegistry::new();
        registry
            .register_skill(SkillDefinition::without_parameters(
                "defined_but_unbound",
                "no code",
            ))
            .expect("register");

        let context = SkillContext::new("session-1");
        let missing = registry
            .execute("unregistered_skill", SkillArgs::new(), &context)
            .await
            .expect_err("unknown skill should fail");
        assert_eq!(missing.kind, SkillErrorKind::NotFound);

        let unbound = registry
            .execute("defined_but_unbound", SkillArgs::new(), &context)
            .await
            .expect_err("unbound skill should fail");
        assert_eq!(unbound.kind, SkillErrorKind::NoHandler);
    }

    #[tokio::test]
    async fn handler_errors_are_returned_unmodified() {
        let registry = SkillRegistry::new();
        registry
            .register(
                echo_definition(),
                FunctionHandler::from_sync(|args, _ctx| {
                    let text = args.required_str("text")?;
                    Ok(SkillOutput::from(text))
                }),
            )
            .expect("register");

        let context = SkillContext::new("session-2");
        let output = registry
            .execute("echo", SkillArgs::new().with("text", "hi"), &context)
            .await
            .expect("echo should succeed");
        assert_eq!(output, SkillOutput::Text("hi".to_string()));

        let error = registry
            .execute("echo", SkillArgs::new(), &context)
            .await
            .expect_err("missing text should fail");
        assert_eq!(
            error,
            SkillError::invalid_arguments("The 'text' parameter is required")
                .with_context("field", "text")
        );
    }

    #[test]
    fn re_registration_replaces_the_definition() {
        let registry = SkillRegistry::new();
        registry.register_skill(echo_definition()).expect("register");
        registry
            .register_skill(SkillDefinition::without_parameters("echo", "replaced"))
            .expect("re-register");

        assert_eq!(registry.count(), 1);
        assert_eq!(
            registry.get_skill("echo").map(|skill| skill.description),
            Some("replaced".to_string())
        );
        assert!(!registry.has_handler("echo"));
    }

    #[test]
    fn listings_are_sorted_by_name() {
        let registry = SkillRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register_skill(SkillDefinition::without_parameters(name, name))
                .expect("register");
        }

        let names = registry
            .tool_definitions()
            .into_iter()
            .map(|tool| tool.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn saving_without_a_directory_is_a_storage_error() {
        let registry = SkillRegistry::new();
        let error = registry.save_skill(echo_definition()).expect_err("no dir");
        assert_eq!(error.kind, SkillErrorKind::Storage);
        assert_eq!(registry.count(), 0);
    }
}
