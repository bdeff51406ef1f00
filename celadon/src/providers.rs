//! Provider construction from a [`RuntimeConfig`].

use std::sync::Arc;

use cprovider::{ModelProvider, ProviderError, ProviderOperationHooks};

use crate::RuntimeConfig;

/// Builds the HTTP-backed provider described by `config`.
///
/// The API key is optional here; backends that require one fail on the first
/// request with an authentication error.
pub fn build_provider(
    config: &RuntimeConfig,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    let base_url = config.base_url.trim();
    if base_url.is_empty() {
        return Err(ProviderError::invalid_request("base url must not be empty"));
    }

    build_openai_compat_provider(config, base_url, hooks)
}

#[cfg(feature = "provider-openai-compat")]
fn build_openai_compat_provider(
    config: &RuntimeConfig,
    base_url: &str,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use cprovider::SecureCredentialManager;
    use cprovider::openai_compat::{OpenAiCompatHttpTransport, OpenAiCompatProvider};

    let credentials = Arc::new(SecureCredentialManager::new());
    if let Some(api_key) = config.api_key.as_ref().filter(|key| !key.is_empty()) {
        credentials.set_api_key(config.provider, api_key.expose())?;
    }

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;
    let transport = Arc::new(OpenAiCompatHttpTransport::new(http, base_url));

    Ok(Arc::new(
        OpenAiCompatProvider::new(config.provider, credentials, transport)
            .with_retry_policy(config.retry_policy.clone())
            .with_hooks(hooks),
    ))
}

#[cfg(not(feature = "provider-openai-compat"))]
fn build_openai_compat_provider(
    _config: &RuntimeConfig,
    _base_url: &str,
    _hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-openai-compat feature is not enabled on celadon",
    ))
}

#[cfg(all(test, feature = "provider-openai-compat"))]
mod tests {
    use std::sync::Arc;

    use cprovider::{NoopOperationHooks, ProviderErrorKind, ProviderId};

    use super::build_provider;
    use crate::RuntimeConfig;

    #[test]
    fn provider_identity_follows_the_detected_backend() {
        let config = RuntimeConfig::new("https://openrouter.ai/api/v1").with_api_key("sk-or");
        let provider = build_provider(&config, Arc::new(NoopOperationHooks)).expect("provider");
        assert_eq!(provider.id(), ProviderId::OpenRouter);
    }

    #[test]
    fn blank_base_url_is_rejected() {
        let config = RuntimeConfig::new("   ");
        let error = build_provider(&config, Arc::new(NoopOperationHooks))
            .err()
            .expect("blank url should fail");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }
}
