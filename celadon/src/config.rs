//! Runtime configuration, built explicitly or from `CELADON_*` environment variables.
//!
//! ```rust
//! use celadon::{ProviderId, RuntimeConfig};
//!
//! let config = RuntimeConfig::new("https://api.venice.ai/api/v1")
//!     .with_api_key("sk-test")
//!     .with_max_tool_round_trips(2);
//!
//! assert_eq!(config.provider, ProviderId::Venice);
//! assert_eq!(config.model().expect("default model"), "venice-uncensored");
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use cchat::{ChatPolicy, ToolOffer};
use cprovider::{ProviderCapabilities, ProviderId, RetryPolicy, SecretString};
use cskills::DEFAULT_SKILL_TIMEOUT;

use crate::RuntimeError;

pub const ENV_PREFIX: &str = "CELADON";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub base_url: String,
    /// Detected from `base_url` unless set explicitly.
    pub provider: ProviderId,
    pub api_key: Option<SecretString>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub skills_dir: Option<PathBuf>,
    /// Where notes and reminders live; those skills stay unregistered without it.
    pub data_dir: Option<PathBuf>,
    pub skill_timeout: Duration,
    pub request_timeout: Duration,
    pub chat_policy: ChatPolicy,
    pub retry_policy: RetryPolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl RuntimeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            provider: ProviderCapabilities::detect(&base_url),
            base_url,
            api_key: None,
            model: None,
            system_prompt: None,
            skills_dir: None,
            data_dir: None,
            skill_timeout: DEFAULT_SKILL_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            chat_policy: ChatPolicy::default(),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Reads the process environment. Unset or blank variables keep their defaults.
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, RuntimeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        let mut provider_override = None;

        for (name, value) in vars {
            let Some(key) = name.as_ref().strip_prefix(ENV_PREFIX).and_then(|rest| rest.strip_prefix('_'))
            else {
                continue;
            };
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "BASE_URL" => config = config.with_base_url(value),
                "PROVIDER" => {
                    provider_override = Some(ProviderId::parse(value).ok_or_else(|| {
                        RuntimeError::configuration(format!(
                            "CELADON_PROVIDER: unknown provider '{value}'"
                        ))
                    })?);
                }
                "API_KEY" => config = config.with_api_key(value),
                "MODEL" => config = config.with_model(value),
                "SYSTEM_PROMPT" => config = config.with_system_prompt(value),
                "SKILLS_DIR" => config = config.with_skills_dir(value),
                "DATA_DIR" => config = config.with_data_dir(value),
                "SKILL_TIMEOUT_SECS" => {
                    config.skill_timeout = Duration::from_secs(parse_var(key, value)?);
                }
                "REQUEST_TIMEOUT_SECS" => {
                    config.request_timeout = Duration::from_secs(parse_var(key, value)?);
                }
                "MAX_TOOL_ROUNDS" => {
                    config = config.with_max_tool_round_trips(parse_var(key, value)?);
                }
                "OFFER_TOOLS" => config = config.with_tool_offer(parse_tool_offer(value)?),
                _ => {}
            }
        }

        // Applied last so the variable order does not matter.
        if let Some(provider) = provider_override {
            config.provider = provider;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.provider = ProviderCapabilities::detect(&self.base_url);
        self
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into().trim()));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_skills_dir(mut self, skills_dir: impl Into<PathBuf>) -> Self {
        self.skills_dir = Some(skills_dir.into());
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    pub fn with_skill_timeout(mut self, skill_timeout: Duration) -> Self {
        self.skill_timeout = skill_timeout;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_max_tool_round_trips(mut self, max_tool_round_trips: usize) -> Self {
        self.chat_policy = self.chat_policy.with_max_tool_round_trips(max_tool_round_trips);
        self
    }

    pub fn with_tool_offer(mut self, offer_tools: ToolOffer) -> Self {
        self.chat_policy = self.chat_policy.with_tool_offer(offer_tools);
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// The configured model, or the provider's default when none was given.
    pub fn model(&self) -> Result<String, RuntimeError> {
        if let Some(model) = self.model.as_deref().map(str::trim)
            && !model.is_empty()
        {
            return Ok(model.to_string());
        }

        match ProviderCapabilities::default_model(self.provider) {
            "" => Err(RuntimeError::configuration(format!(
                "no model configured for provider {}; set CELADON_MODEL",
                self.provider
            ))),
            model => Ok(model.to_string()),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, RuntimeError> {
    value.parse().map_err(|_| {
        RuntimeError::configuration(format!(
            "{ENV_PREFIX}_{key}: expected a non-negative integer, got '{value}'"
        ))
    })
}

fn parse_tool_offer(value: &str) -> Result<ToolOffer, RuntimeError> {
    match value.to_ascii_lowercase().as_str() {
        "auto" => Ok(ToolOffer::Auto),
        "always" | "true" | "on" => Ok(ToolOffer::Always),
        "never" | "false" | "off" => Ok(ToolOffer::Never),
        other => Err(RuntimeError::configuration(format!(
            "{ENV_PREFIX}_OFFER_TOOLS: expected auto, always, or never, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_openai() {
        let config = RuntimeConfig::default();
        assert_eq!(config.provider, ProviderId::OpenAi);
        assert_eq!(config.model().expect("model"), "gpt-4o-mini");
        assert_eq!(config.skill_timeout, Duration::from_secs(30));
        assert_eq!(config.chat_policy.max_tool_round_trips, 4);
    }

    #[test]
    fn environment_overrides_apply_in_any_order() {
        let config = RuntimeConfig::from_vars([
            ("CELADON_PROVIDER", "grok"),
            ("CELADON_BASE_URL", "http://localhost:8080/v1"),
            ("CELADON_MODEL", "grok-4-latest"),
            ("CELADON_SKILL_TIMEOUT_SECS", "5"),
            ("CELADON_MAX_TOOL_ROUNDS", "2"),
            ("CELADON_OFFER_TOOLS", "never"),
            ("CELADON_API_KEY", "  "),
            ("CELADON_DATA_DIR", "/var/lib/celadon"),
            ("HOME", "/root"),
        ])
        .expect("config");

        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.provider, ProviderId::Grok);
        assert_eq!(config.model().expect("model"), "grok-4-latest");
        assert_eq!(config.skill_timeout, Duration::from_secs(5));
        assert_eq!(config.chat_policy.max_tool_round_trips, 2);
        assert_eq!(config.chat_policy.offer_tools, ToolOffer::Never);
        assert!(config.api_key.is_none());
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/celadon")));
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let error = RuntimeConfig::from_vars([("CELADON_REQUEST_TIMEOUT_SECS", "soon")])
            .expect_err("non-numeric timeout");
        assert!(error.message.contains("CELADON_REQUEST_TIMEOUT_SECS"));

        let error = RuntimeConfig::from_vars([("CELADON_PROVIDER", "acme")])
            .expect_err("unknown provider");
        assert_eq!(error.kind, crate::RuntimeErrorKind::Configuration);
    }

    #[test]
    fn unknown_backends_need_an_explicit_model() {
        let config = RuntimeConfig::new("http://localhost:11434/v1");
        assert_eq!(config.provider, ProviderId::Unknown);
        assert!(config.model().is_err());
        assert_eq!(
            config.with_model("llama3.1").model().expect("model"),
            "llama3.1"
        );
    }
}
