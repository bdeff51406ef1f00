//! Model catalogue: static fallbacks, live listing, and model validation.
//!
//! ```rust
//! use cprovider::{ModelCatalog, ProviderId, format_model_list};
//!
//! let models = ModelCatalog::static_models(ProviderId::OpenAi);
//! assert_eq!(models[0].id, "gpt-4o-mini");
//!
//! let listing = format_model_list(&models, true);
//! assert!(listing.starts_with("Function Calling Enabled (Skills Available):"));
//! ```

use std::sync::Arc;
use std::time::Duration;

use ccommon::timeout;

use crate::{ModelProvider, ProviderCapabilities, ProviderError, ProviderId};

pub const DEFAULT_LISTING_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub supports_tools: bool,
    /// Zero when unknown.
    pub context_window: u32,
    pub description: String,
    pub provider: ProviderId,
}

impl ModelInfo {
    fn fixed(
        provider: ProviderId,
        id: &str,
        name: &str,
        supports_tools: bool,
        context_window: u32,
        description: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            supports_tools,
            context_window,
            description: description.to_string(),
            provider,
        }
    }
}

/// Where a model list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    Live,
    /// The provider has no listing endpoint; the static list is authoritative.
    Static,
    /// Live listing failed; the static list stands in.
    Fallback(ProviderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelListing {
    pub models: Vec<ModelInfo>,
    pub source: ListingSource,
}

/// Model catalogue bound to one provider and, optionally, a live listing source.
#[derive(Clone)]
pub struct ModelCatalog {
    provider: ProviderId,
    source: Option<Arc<dyn ModelProvider>>,
    listing_timeout: Duration,
}

impl std::fmt::Debug for ModelCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCatalog")
            .field("provider", &self.provider)
            .field("has_source", &self.source.is_some())
            .field("listing_timeout", &self.listing_timeout)
            .finish()
    }
}

impl ModelCatalog {
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            source: None,
            listing_timeout: DEFAULT_LISTING_TIMEOUT,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn ModelProvider>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_listing_timeout(mut self, listing_timeout: Duration) -> Self {
        self.listing_timeout = listing_timeout;
        self
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn best_tool_model(&self) -> &'static str {
        ProviderCapabilities::best_tool_model(self.provider)
    }

    /// Lists models, falling back to the static list when live listing is
    /// unsupported, unavailable, or slower than the listing timeout.
    pub async fn list_models(&self) -> ModelListing {
        let Some(capability) = ProviderCapabilities::get(self.provider) else {
            return ModelListing {
                models: Vec::new(),
                source: ListingSource::Fallback(ProviderError::invalid_request(format!(
                    "unknown provider: {}",
                    self.provider
                ))),
            };
        };

        if !capability.supports_model_listing {
            return ModelListing {
                models: Self::static_models(self.provider),
                source: ListingSource::Static,
            };
        }

        let Some(source) = self.source.as_ref() else {
            return self.fallback(ProviderError::unavailable("no listing source configured"));
        };

        let ids = match timeout(self.listing_timeout, source.list_models()).await {
            Ok(Ok(ids)) => ids,
            Ok(Err(error)) => return self.fallback(error),
            Err(elapsed) => return self.fallback(ProviderError::from(elapsed)),
        };

        let mut models = ids
            .into_iter()
            .map(|id| ModelInfo {
                name: self.display_name(&id),
                supports_tools: ProviderCapabilities::supports_tools(self.provider, &id),
                context_window: 0,
                description: self.describe(&id),
                provider: self.provider,
                id,
            })
            .collect::<Vec<_>>();
        sort_tool_capable_first(&mut models);

        ModelListing {
            models,
            source: ListingSource::Live,
        }
    }

    /// Resolves a model id. Listing failures degrade to heuristic info;
    /// a model missing from a successful listing is an error.
    pub async fn validate_model(&self, model_id: &str) -> Result<ModelInfo, ProviderError> {
        let listing = self.list_models().await;

        if let ListingSource::Fallback(error) = &listing.source {
            tracing::debug!(
                provider = %self.provider,
                model = model_id,
                error = %error,
                "model validation unavailable, using heuristics"
            );
            return Ok(ModelInfo {
                id: model_id.to_string(),
                name: model_id.to_string(),
                supports_tools: ProviderCapabilities::supports_tools(self.provider, model_id),
                context_window: 0,
                description: "Model validation unavailable".to_string(),
                provider: self.provider,
            });
        }

        listing
            .models
            .into_iter()
            .find(|model| model.id == model_id)
            .ok_or_else(|| {
                ProviderError::invalid_request(format!(
                    "model {model_id} not found for provider {}",
                    self.provider
                ))
            })
    }

    pub fn static_models(provider: ProviderId) -> Vec<ModelInfo> {
        let m = |id, name, tools, context, description| {
            ModelInfo::fixed(provider, id, name, tools, context, description)
        };

        match provider {
            ProviderId::Grok => vec![
                m(
                    "grok-4-1-fast",
                    "Grok 4.1 Fast",
                    true,
                    2_000_000,
                    "Best for tool calling (2M context, optimized for agentic tasks)",
                ),
                m(
                    "grok-4-1",
                    "Grok 4.1",
                    true,
                    131_072,
                    "High-quality reasoning with tool support",
                ),
                m(
                    "grok-beta",
                    "Grok Beta",
                    true,
                    131_072,
                    "Beta version with tool calling",
                ),
                m(
                    "grok-4-latest",
                    "Grok 4 Latest",
                    false,
                    131_072,
                    "Latest general model (limited tool support)",
                ),
            ],
            ProviderId::OpenAi => vec![
                m(
                    "gpt-4o-mini",
                    "GPT-4o Mini",
                    true,
                    128_000,
                    "Fast, affordable, smart for everyday tasks",
                ),
                m(
                    "gpt-4o",
                    "GPT-4o",
                    true,
                    128_000,
                    "High intelligence flagship model",
                ),
                m(
                    "gpt-4-turbo",
                    "GPT-4 Turbo",
                    true,
                    128_000,
                    "Previous flagship with vision and tools",
                ),
                m(
                    "gpt-3.5-turbo",
                    "GPT-3.5 Turbo",
                    true,
                    16_385,
                    "Fast and affordable legacy model",
                ),
            ],
            ProviderId::Venice => vec![
                m(
                    "venice-uncensored",
                    "Venice Uncensored",
                    false,
                    0,
                    "NSFW uncensored chat (no function calling)",
                ),
                m(
                    "llama-3.3-70b",
                    "Llama 3.3 70B",
                    true,
                    0,
                    "Open source model with tool support",
                ),
                m(
                    "qwen3-235b",
                    "Qwen 3 235B",
                    true,
                    0,
                    "Large open model with function calling",
                ),
            ],
            ProviderId::Anthropic => vec![
                m(
                    "claude-sonnet-4-5-20250929",
                    "Claude Sonnet 4.5",
                    true,
                    200_000,
                    "Latest Sonnet with advanced tool use",
                ),
                m(
                    "claude-opus-4-5-20251101",
                    "Claude Opus 4.5",
                    true,
                    200_000,
                    "Most capable Claude model",
                ),
            ],
            ProviderId::Gemini => vec![
                m(
                    "gemini-2.0-flash",
                    "Gemini 2.0 Flash",
                    true,
                    1_000_000,
                    "Fast multimodal model with function calling",
                ),
                m(
                    "gemini-1.5-pro",
                    "Gemini 1.5 Pro",
                    true,
                    2_000_000,
                    "Google's flagship with function calling",
                ),
                m(
                    "gemini-1.5-flash",
                    "Gemini 1.5 Flash",
                    true,
                    1_000_000,
                    "Fast and efficient with tools",
                ),
            ],
            ProviderId::Vertex => vec![
                m(
                    "gemini-1.5-pro",
                    "Gemini 1.5 Pro",
                    true,
                    2_000_000,
                    "Google's flagship with function calling",
                ),
                m(
                    "gemini-1.5-flash",
                    "Gemini 1.5 Flash",
                    true,
                    1_000_000,
                    "Fast and efficient with tools",
                ),
            ],
            ProviderId::OpenRouter => vec![
                m(
                    "openai/gpt-4o-mini",
                    "GPT-4o Mini (via OpenRouter)",
                    true,
                    0,
                    "OpenAI model via OpenRouter",
                ),
                m(
                    "anthropic/claude-sonnet-4-5",
                    "Claude Sonnet 4.5 (via OpenRouter)",
                    true,
                    0,
                    "Claude via OpenRouter",
                ),
            ],
            ProviderId::DigitalOcean => vec![m(
                "gpt-4o-mini",
                "GPT-4o Mini",
                false,
                0,
                "Agent endpoint (no local skills)",
            )],
            ProviderId::ElevenLabs | ProviderId::Unknown => Vec::new(),
        }
    }

    fn fallback(&self, error: ProviderError) -> ModelListing {
        tracing::warn!(
            provider = %self.provider,
            error = %error,
            "model listing failed, using static models"
        );

        ModelListing {
            models: Self::static_models(self.provider),
            source: ListingSource::Fallback(error),
        }
    }

    fn display_name(&self, model_id: &str) -> String {
        let provider_prefix = format!("{}/", self.provider);
        let trimmed = model_id.strip_prefix(&provider_prefix).unwrap_or(model_id);
        let trimmed = trimmed.strip_prefix("openai/").unwrap_or(trimmed);
        let trimmed = trimmed.strip_prefix("anthropic/").unwrap_or(trimmed);

        title_case(&trimmed.replace('-', " "))
    }

    fn describe(&self, model_id: &str) -> String {
        if let Some(known) = Self::static_models(self.provider)
            .into_iter()
            .find(|model| model.id == model_id)
        {
            return known.description;
        }

        const PATTERNS: [(&str, &str); 6] = [
            ("mini", "Fast and affordable"),
            ("turbo", "Optimized for speed"),
            ("fast", "High-speed model"),
            ("opus", "Most capable model"),
            ("sonnet", "Balanced performance"),
            ("uncensored", "Uncensored content"),
        ];

        let lower = model_id.to_lowercase();
        PATTERNS
            .iter()
            .find(|(marker, _)| lower.contains(marker))
            .map(|(_, description)| description.to_string())
            .unwrap_or_else(|| "Available model".to_string())
    }
}

/// Upper-cases each letter that starts a word; digits and underscores do not break words.
fn title_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut at_word_start = true;

    for character in value.chars() {
        if at_word_start {
            output.extend(character.to_uppercase());
        } else {
            output.push(character);
        }
        at_word_start = !(character.is_alphanumeric() || character == '_');
    }

    output
}

/// Stable partition: tool-capable models first, original order kept within each group.
pub fn sort_tool_capable_first(models: &mut [ModelInfo]) {
    models.sort_by_key(|model| !model.supports_tools);
}

/// Renders a model list for display, grouping tool-capable models first.
pub fn format_model_list(models: &[ModelInfo], highlight_tool_models: bool) -> String {
    let mut tool_lines = Vec::new();
    let mut other_lines = Vec::new();

    for model in models {
        let mut line = format!("  {}", model.id);
        if !model.description.is_empty() {
            line.push_str(&format!(" - {}", model.description));
        }
        if model.context_window > 0 {
            line.push_str(&format!(" ({}k context)", model.context_window / 1000));
        }

        if model.supports_tools {
            if highlight_tool_models {
                tool_lines.push(format!("✓ {line}"));
            } else {
                tool_lines.push(line);
            }
        } else {
            other_lines.push(format!("{line} (no skills)"));
        }
    }

    let mut output = String::new();
    if !tool_lines.is_empty() {
        if highlight_tool_models {
            output.push_str("Function Calling Enabled (Skills Available):\n");
        }
        for line in &tool_lines {
            output.push_str(line);
            output.push('\n');
        }
    }

    if !other_lines.is_empty() {
        if !tool_lines.is_empty() {
            output.push('\n');
        }
        if highlight_tool_models {
            output.push_str("Other Models (Skills Disabled):\n");
        }
        for line in &other_lines {
            output.push_str(line);
            output.push('\n');
        }
    }

    output
}
