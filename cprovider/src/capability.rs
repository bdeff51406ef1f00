//! Static provider capability table and model-support rules.
//!
//! ```rust
//! use cprovider::{ProviderCapabilities, ProviderId};
//!
//! assert_eq!(ProviderCapabilities::detect("https://api.x.ai/v1"), ProviderId::Grok);
//! assert_eq!(ProviderCapabilities::detect(""), ProviderId::Unknown);
//! assert!(!ProviderCapabilities::supports_tools(ProviderId::Venice, "venice-uncensored"));
//! assert!(ProviderCapabilities::supports_tools(ProviderId::Venice, "llama-3.3-70b"));
//! ```

use crate::ProviderId;

/// Declared feature support for one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCapability {
    pub provider: ProviderId,
    pub display_name: &'static str,
    /// Empty when the endpoint is account or project specific.
    pub base_url: &'static str,
    pub supports_function_calling: bool,
    pub supports_model_listing: bool,
    pub supports_token_tracking: bool,
    pub is_openai_compatible: bool,
    pub requires_api_key: bool,
    pub default_model: &'static str,
    /// Empty when the provider has no tool-capable model.
    pub preferred_tool_model: &'static str,
    pub notes: &'static str,
}

const CAPABILITIES: [ProviderCapability; 9] = [
    ProviderCapability {
        provider: ProviderId::OpenAi,
        display_name: "OpenAI",
        base_url: "https://api.openai.com/v1",
        supports_function_calling: true,
        supports_model_listing: true,
        supports_token_tracking: true,
        is_openai_compatible: true,
        requires_api_key: true,
        default_model: "gpt-4o-mini",
        preferred_tool_model: "gpt-4o-mini",
        notes: "Native function calling support. Gold standard implementation.",
    },
    ProviderCapability {
        provider: ProviderId::Grok,
        display_name: "xAI Grok",
        base_url: "https://api.x.ai/v1",
        supports_function_calling: true,
        supports_model_listing: true,
        supports_token_tracking: true,
        is_openai_compatible: true,
        requires_api_key: true,
        default_model: "grok-4-1-fast",
        preferred_tool_model: "grok-4-1-fast",
        notes: "Use grok-4-1-fast for best tool calling performance. 2M context window.",
    },
    ProviderCapability {
        provider: ProviderId::Venice,
        display_name: "Venice.ai",
        base_url: "https://api.venice.ai/api/v1",
        supports_function_calling: false,
        supports_model_listing: true,
        supports_token_tracking: true,
        is_openai_compatible: true,
        requires_api_key: true,
        default_model: "venice-uncensored",
        preferred_tool_model: "",
        notes: "NSFW mode uses Venice. No function calling in uncensored mode.",
    },
    ProviderCapability {
        provider: ProviderId::Anthropic,
        display_name: "Anthropic Claude",
        base_url: "https://api.anthropic.com/v1",
        supports_function_calling: true,
        supports_model_listing: false,
        supports_token_tracking: false,
        is_openai_compatible: false,
        requires_api_key: true,
        default_model: "claude-sonnet-4-5-20250929",
        preferred_tool_model: "claude-sonnet-4-5-20250929",
        notes: "OpenAI wire compatibility is for testing only. Native API recommended.",
    },
    ProviderCapability {
        provider: ProviderId::Gemini,
        display_name: "Google Gemini AI (AI Studio)",
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
        supports_function_calling: true,
        supports_model_listing: true,
        supports_token_tracking: true,
        is_openai_compatible: true,
        requires_api_key: true,
        default_model: "gemini-2.0-flash",
        preferred_tool_model: "gemini-2.0-flash",
        notes: "API keys from aistudio.google.com. OpenAI-compatible endpoint.",
    },
    ProviderCapability {
        provider: ProviderId::Vertex,
        display_name: "Google Vertex AI (Gemini)",
        base_url: "",
        supports_function_calling: true,
        supports_model_listing: false,
        supports_token_tracking: false,
        is_openai_compatible: true,
        requires_api_key: false,
        default_model: "gemini-2.0-flash",
        preferred_tool_model: "gemini-2.0-flash",
        notes: "Requires Google Cloud credentials and a project-specific endpoint.",
    },
    ProviderCapability {
        provider: ProviderId::OpenRouter,
        display_name: "OpenRouter",
        base_url: "https://openrouter.ai/api/v1",
        supports_function_calling: true,
        supports_model_listing: true,
        supports_token_tracking: true,
        is_openai_compatible: true,
        requires_api_key: true,
        default_model: "openai/gpt-4o-mini",
        preferred_tool_model: "openai/gpt-4o-mini",
        notes: "Aggregator for multiple providers. Parallel function calling supported.",
    },
    ProviderCapability {
        provider: ProviderId::DigitalOcean,
        display_name: "DigitalOcean Gradient",
        base_url: "",
        supports_function_calling: false,
        supports_model_listing: false,
        supports_token_tracking: false,
        is_openai_compatible: true,
        requires_api_key: true,
        default_model: "gpt-4o-mini",
        preferred_tool_model: "",
        notes: "Agent API runs cloud-hosted functions only. Local skills unavailable.",
    },
    ProviderCapability {
        provider: ProviderId::ElevenLabs,
        display_name: "ElevenLabs",
        base_url: "https://api.elevenlabs.io/v1",
        supports_function_calling: false,
        supports_model_listing: false,
        supports_token_tracking: false,
        is_openai_compatible: false,
        requires_api_key: true,
        default_model: "",
        preferred_tool_model: "",
        notes: "Voice AI provider. Function calling support unknown.",
    },
];

/// Host substrings checked in order when no base URL matches exactly.
/// `generativelanguage` precedes the broader `googleapis.com` vertex rule.
const HOST_RULES: &[(&str, ProviderId)] = &[
    ("openai.com", ProviderId::OpenAi),
    ("x.ai", ProviderId::Grok),
    ("venice.ai", ProviderId::Venice),
    ("anthropic.com", ProviderId::Anthropic),
    ("generativelanguage.googleapis.com", ProviderId::Gemini),
    ("googleapis.com", ProviderId::Vertex),
    ("vertexai", ProviderId::Vertex),
    ("openrouter.ai", ProviderId::OpenRouter),
    ("digitalocean", ProviderId::DigitalOcean),
    ("elevenlabs.io", ProviderId::ElevenLabs),
];

/// How one rule in a provider's tool-support table matches a model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelRule {
    /// Models containing the marker never receive tools.
    Exclude(&'static str),
    /// Models containing the marker belong to a tool-capable family.
    Family(&'static str),
    /// Every model not excluded above is tool-capable.
    AnyRemaining,
}

fn tool_rules(provider: ProviderId) -> &'static [ModelRule] {
    use ModelRule::{AnyRemaining, Exclude, Family};

    match provider {
        ProviderId::OpenAi => &[Family("gpt-4"), Family("gpt-3.5-turbo")],
        ProviderId::Grok => &[Family("grok-4"), Family("grok-beta")],
        ProviderId::Venice => &[Exclude("uncensored"), AnyRemaining],
        ProviderId::Anthropic => &[
            Family("claude-3"),
            Family("claude-4"),
            Family("claude-sonnet"),
        ],
        ProviderId::Gemini | ProviderId::Vertex => &[Family("gemini")],
        ProviderId::OpenRouter => &[Family("gpt-"), Family("claude-"), Family("gemini-")],
        ProviderId::DigitalOcean | ProviderId::ElevenLabs | ProviderId::Unknown => &[],
    }
}

/// Read-only queries over the provider capability table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderCapabilities;

impl ProviderCapabilities {
    pub fn get(provider: ProviderId) -> Option<&'static ProviderCapability> {
        CAPABILITIES.iter().find(|entry| entry.provider == provider)
    }

    /// Looks a provider up by its key, e.g. `"grok"`.
    pub fn get_by_key(key: &str) -> Option<&'static ProviderCapability> {
        ProviderId::parse(key).and_then(Self::get)
    }

    pub fn list() -> &'static [ProviderCapability] {
        &CAPABILITIES
    }

    pub fn tool_calling_providers() -> Vec<ProviderId> {
        CAPABILITIES
            .iter()
            .filter(|entry| entry.supports_function_calling)
            .map(|entry| entry.provider)
            .collect()
    }

    /// Classifies a base URL. Total over all inputs: unmatched strings yield `Unknown`.
    pub fn detect(base_url: &str) -> ProviderId {
        if !base_url.is_empty()
            && let Some(entry) = CAPABILITIES
                .iter()
                .find(|entry| !entry.base_url.is_empty() && entry.base_url == base_url)
        {
            return entry.provider;
        }

        HOST_RULES
            .iter()
            .find(|(marker, _)| base_url.contains(marker))
            .map(|(_, provider)| *provider)
            .unwrap_or(ProviderId::Unknown)
    }

    /// Exclusions win over families; anything unmatched is not tool-capable.
    pub fn supports_tools(provider: ProviderId, model_id: &str) -> bool {
        let rules = tool_rules(provider);

        if rules
            .iter()
            .any(|rule| matches!(rule, ModelRule::Exclude(marker) if model_id.contains(marker)))
        {
            return false;
        }

        rules.iter().any(|rule| match rule {
            ModelRule::Family(marker) => model_id.contains(marker),
            ModelRule::AnyRemaining => true,
            ModelRule::Exclude(_) => false,
        })
    }

    /// The preferred tool model, or `""` when the provider has none.
    pub fn best_tool_model(provider: ProviderId) -> &'static str {
        Self::get(provider)
            .map(|entry| entry.preferred_tool_model)
            .unwrap_or_default()
    }

    pub fn default_model(provider: ProviderId) -> &'static str {
        Self::get(provider)
            .map(|entry| entry.default_model)
            .unwrap_or_default()
    }
}
