//! In-memory API key storage with redacted debug output.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{ProviderCapabilities, ProviderError, ProviderId};

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// API keys keyed by provider. Keys are trimmed on entry and never printed.
#[derive(Default)]
pub struct SecureCredentialManager {
    api_keys: Mutex<HashMap<ProviderId, SecretString>>,
}

impl std::fmt::Debug for SecureCredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers = self
            .api_keys
            .lock()
            .map(|keys| keys.keys().copied().collect::<Vec<_>>())
            .unwrap_or_default();

        f.debug_struct("SecureCredentialManager")
            .field("providers", &providers)
            .finish()
    }
}

impl SecureCredentialManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(
        self,
        provider: ProviderId,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        self.set_api_key(provider, api_key)?;
        Ok(self)
    }

    pub fn set_api_key(
        &self,
        provider: ProviderId,
        api_key: impl Into<String>,
    ) -> Result<(), ProviderError> {
        let api_key = SecretString::new(api_key.into().trim());
        if api_key.is_empty() {
            return Err(ProviderError::authentication("api key must not be empty"));
        }

        self.keys()?.insert(provider, api_key);
        Ok(())
    }

    pub fn api_key(&self, provider: ProviderId) -> Result<Option<SecretString>, ProviderError> {
        Ok(self.keys()?.get(&provider).cloned())
    }

    pub fn has_credentials(&self, provider: ProviderId) -> Result<bool, ProviderError> {
        Ok(self.keys()?.contains_key(&provider))
    }

    /// Key to send for `provider`, failing only when the provider declares one mandatory.
    pub fn resolve(&self, provider: ProviderId) -> Result<Option<SecretString>, ProviderError> {
        let key = self.api_key(provider)?;
        let required = ProviderCapabilities::get(provider)
            .map(|capability| capability.requires_api_key)
            .unwrap_or(false);

        if key.is_none() && required {
            return Err(ProviderError::authentication(format!(
                "no API key configured for {provider}"
            )));
        }

        Ok(key)
    }

    pub fn clear(&self, provider: ProviderId) -> Result<bool, ProviderError> {
        Ok(self.keys()?.remove(&provider).is_some())
    }

    fn keys(&self) -> Result<MutexGuard<'_, HashMap<ProviderId, SecretString>>, ProviderError> {
        self.api_keys
            .lock()
            .map_err(|_| ProviderError::other("credential manager lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let manager = SecureCredentialManager::new()
            .with_api_key(ProviderId::Grok, "xai-secret")
            .expect("key should store");

        let secret = manager
            .api_key(ProviderId::Grok)
            .expect("lock")
            .expect("key present");
        assert_eq!(secret.expose(), "xai-secret");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert!(!format!("{manager:?}").contains("xai-secret"));
    }

    #[test]
    fn blank_keys_are_rejected() {
        let manager = SecureCredentialManager::new();
        let error = manager
            .set_api_key(ProviderId::OpenAi, "   ")
            .expect_err("blank key should fail");

        assert_eq!(error.kind, ProviderErrorKind::Authentication);
        assert!(!manager.has_credentials(ProviderId::OpenAi).expect("lock"));
    }

    #[test]
    fn resolve_requires_keys_only_where_declared() {
        let manager = SecureCredentialManager::new();

        let error = manager
            .resolve(ProviderId::OpenAi)
            .expect_err("openai needs a key");
        assert_eq!(error.kind, ProviderErrorKind::Authentication);

        assert!(manager.resolve(ProviderId::Vertex).expect("optional").is_none());
        assert!(manager.resolve(ProviderId::Unknown).expect("optional").is_none());

        manager
            .set_api_key(ProviderId::OpenAi, " sk-test ")
            .expect("key should store");
        let key = manager
            .resolve(ProviderId::OpenAi)
            .expect("resolved")
            .expect("present");
        assert_eq!(key.expose(), "sk-test");

        assert!(manager.clear(ProviderId::OpenAi).expect("lock"));
        assert!(!manager.clear(ProviderId::OpenAi).expect("lock"));
    }
}
