//! Runtime wiring: provider, skills, chat service, and model catalog from one config.

use std::sync::Arc;

use cchat::{ChatService, ChatSession, InMemoryConversationStore};
use cobserve::{SafeChatHooks, SafeProviderHooks, SafeSkillHooks, TracingObservabilityHooks};
use cprovider::{ModelCatalog, ModelProvider};
use cskills::builtin::{DataStore, register_builtin_skills, register_data_skills};
use cskills::{EnvSkillConfig, LoadReport, SkillConfigSource, SkillExecutor, SkillRegistry};

use crate::selection::{ModelSelection, select_model};
use crate::{RuntimeConfig, RuntimeError, build_provider};

#[derive(Clone)]
pub struct RuntimeBundle {
    pub config: RuntimeConfig,
    pub provider: Arc<dyn ModelProvider>,
    pub registry: Arc<SkillRegistry>,
    pub executor: SkillExecutor,
    pub chat: ChatService,
    pub catalog: ModelCatalog,
    /// Result of scanning `config.skills_dir`; empty when no directory was configured.
    pub load_report: Arc<LoadReport>,
}

impl RuntimeBundle {
    pub fn session(&self, id: impl Into<String>) -> Result<ChatSession, RuntimeError> {
        let session = ChatSession::new(id, self.config.provider, self.config.model()?);
        Ok(match self.config.system_prompt.as_deref() {
            Some(prompt) => session.with_system_prompt(prompt),
            None => session,
        })
    }

    /// Validates the configured model against the provider's listing.
    pub async fn select_model(&self, force: bool) -> Result<ModelSelection, RuntimeError> {
        let model = self.config.model()?;
        select_model(&self.catalog, &model, force)
            .await
            .map_err(|error| RuntimeError::model_selection(error.to_string()))
    }
}

/// Builds the HTTP provider from `config` and wires skills configured from the environment.
pub fn build_runtime(config: RuntimeConfig) -> Result<RuntimeBundle, RuntimeError> {
    let provider = build_provider(
        &config,
        Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)),
    )?;
    build_runtime_with(config, provider, Arc::new(EnvSkillConfig::new()))
}

pub fn build_runtime_with(
    config: RuntimeConfig,
    provider: Arc<dyn ModelProvider>,
    skill_config: Arc<dyn SkillConfigSource>,
) -> Result<RuntimeBundle, RuntimeError> {
    let mut registry = SkillRegistry::new();
    if let Some(dir) = config.skills_dir.as_ref() {
        registry = registry.with_skills_dir(dir);
    }
    register_builtin_skills(&registry, skill_config)?;
    if let Some(dir) = config.data_dir.as_ref() {
        register_data_skills(&registry, DataStore::new(dir))?;
    }

    let load_report = match config.skills_dir.as_ref() {
        Some(dir) => registry.load_skills(dir)?,
        None => LoadReport::default(),
    };
    tracing::info!(
        phase = "runtime",
        event = "skills_loaded",
        provider = %config.provider,
        loaded = load_report.loaded.len(),
        failed = load_report.failures.len(),
    );

    let registry = Arc::new(registry);
    let executor = SkillExecutor::new(Arc::clone(&registry))
        .with_timeout(config.skill_timeout)
        .with_hooks(Arc::new(SafeSkillHooks::new(TracingObservabilityHooks)));

    let chat = ChatService::builder(Arc::clone(&provider))
        .store(Arc::new(InMemoryConversationStore::new()))
        .skills(executor.clone())
        .policy(config.chat_policy)
        .hooks(Arc::new(SafeChatHooks::new(TracingObservabilityHooks)))
        .build();

    let catalog = ModelCatalog::new(config.provider).with_source(Arc::clone(&provider));

    Ok(RuntimeBundle {
        config,
        provider,
        registry,
        executor,
        chat,
        catalog,
        load_report: Arc::new(load_report),
    })
}
