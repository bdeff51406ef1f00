//! Model validation and tool-capability suggestions.

use cprovider::{ModelCatalog, ModelInfo, ProviderCapabilities, ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: ModelInfo,
    /// The model was absent from the provider's listing and accepted anyway.
    pub forced: bool,
    /// Better tool-calling model on the same provider, when the chosen one lacks tools.
    pub tool_suggestion: Option<&'static str>,
}

impl ModelSelection {
    pub fn supports_tools(&self) -> bool {
        self.model.supports_tools
    }
}

/// Validates `requested` against `catalog`. With `force`, a model missing from
/// a successful listing is accepted using heuristic capability info.
pub async fn select_model(
    catalog: &ModelCatalog,
    requested: &str,
    force: bool,
) -> Result<ModelSelection, ProviderError> {
    let requested = requested.trim();
    if requested.is_empty() {
        return Err(ProviderError::invalid_request("model id must not be empty"));
    }

    let (model, forced) = match catalog.validate_model(requested).await {
        Ok(model) => (model, false),
        Err(error) if force && error.kind == ProviderErrorKind::InvalidRequest => {
            tracing::warn!(
                provider = %catalog.provider(),
                model = requested,
                "model not listed by provider, forcing selection"
            );
            (heuristic_info(catalog, requested), true)
        }
        Err(error) => return Err(error),
    };

    let tool_suggestion = suggest_tool_model(catalog, &model);
    Ok(ModelSelection {
        model,
        forced,
        tool_suggestion,
    })
}

fn heuristic_info(catalog: &ModelCatalog, id: &str) -> ModelInfo {
    let provider = catalog.provider();
    ModelInfo {
        id: id.to_string(),
        name: id.to_string(),
        supports_tools: ProviderCapabilities::supports_tools(provider, id),
        context_window: 0,
        description: "Unlisted model".to_string(),
        provider,
    }
}

fn suggest_tool_model(catalog: &ModelCatalog, model: &ModelInfo) -> Option<&'static str> {
    if model.supports_tools {
        return None;
    }

    match catalog.best_tool_model() {
        "" => None,
        best if best == model.id => None,
        best => Some(best),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cprovider::{BoxedEventStream, ModelProvider, ModelRequest, ProviderFuture, ProviderId};

    use super::*;

    struct ListingProvider(Vec<&'static str>);

    impl ModelProvider for ListingProvider {
        fn id(&self) -> ProviderId {
            ProviderId::Grok
        }

        fn stream<'a>(
            &'a self,
            _request: ModelRequest,
        ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
            Box::pin(async { Err(ProviderError::unavailable("listing only")) })
        }

        fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
            Box::pin(async move { Ok(self.0.iter().map(|id| id.to_string()).collect()) })
        }
    }

    fn grok_catalog() -> ModelCatalog {
        ModelCatalog::new(ProviderId::Grok).with_source(Arc::new(ListingProvider(vec![
            "grok-4-1-fast",
            "grok-2-image",
        ])))
    }

    #[tokio::test]
    async fn models_without_tools_get_a_suggestion() {
        let catalog = grok_catalog();

        let selection = select_model(&catalog, "grok-2-image", false)
            .await
            .expect("listed model");
        assert!(!selection.forced);
        assert!(!selection.supports_tools());
        assert_eq!(selection.tool_suggestion, Some("grok-4-1-fast"));

        let preferred = select_model(&catalog, " grok-4-1-fast ", false)
            .await
            .expect("listed model");
        assert!(preferred.supports_tools());
        assert_eq!(preferred.tool_suggestion, None);
    }

    #[tokio::test]
    async fn unlisted_models_need_force() {
        let catalog = grok_catalog();

        let error = select_model(&catalog, "mystery-model", false)
            .await
            .expect_err("unlisted model should fail");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);

        let forced = select_model(&catalog, "mystery-model", true)
            .await
            .expect("forced selection");
        assert!(forced.forced);
        assert_eq!(forced.model.id, "mystery-model");
    }

    #[tokio::test]
    async fn providers_without_tool_models_never_suggest() {
        let catalog = ModelCatalog::new(ProviderId::ElevenLabs);
        let selection = select_model(&catalog, "eleven_multilingual_v2", true)
            .await
            .expect("forced selection");
        assert_eq!(selection.tool_suggestion, None);
    }
}
