//! Provider implementation for OpenAI wire-compatible chat backends.

use std::sync::Arc;

use async_stream::try_stream;
use futures_timer::Delay;
use futures_util::StreamExt;

use crate::{
    BoxedEventStream, ModelProvider, ModelRequest, NoopOperationHooks, ProviderCapabilities,
    ProviderError, ProviderFuture, ProviderId, ProviderOperation, ProviderOperationHooks,
    RetryPolicy, SecureCredentialManager, StreamEvent, execute_with_retry,
};

use super::transport::OpenAiCompatTransport;
use super::types::{OpenAiCompatAuth, OpenAiCompatRequest};

/// One provider type serves every backend that speaks the chat-completions wire format;
/// `id` only selects credentials and capability flags.
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    id: ProviderId,
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn OpenAiCompatTransport>,
    retry_policy: RetryPolicy,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("id", &self.id)
            .field("transport", &self.transport)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

impl OpenAiCompatProvider {
    pub fn new(
        id: ProviderId,
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn OpenAiCompatTransport>,
    ) -> Self {
        Self {
            id,
            credentials,
            transport,
            retry_policy: RetryPolicy::default(),
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    fn auth(&self) -> Result<OpenAiCompatAuth, ProviderError> {
        Ok(OpenAiCompatAuth {
            api_key: self.credentials.resolve(self.id)?,
        })
    }

    /// Unknown backends are asked for usage too; most compatible servers ignore the option.
    fn include_usage(&self) -> bool {
        ProviderCapabilities::get(self.id)
            .map(|capability| capability.supports_token_tracking)
            .unwrap_or(true)
    }

    pub(crate) fn build_request(&self, request: ModelRequest) -> OpenAiCompatRequest {
        OpenAiCompatRequest::from_model_request(request, self.include_usage())
    }
}

impl ModelProvider for OpenAiCompatProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let auth = self.auth()?;
            let wire_request = self.build_request(request);

            let mut chunks = execute_with_retry(
                self.id,
                ProviderOperation::OpenStream,
                &self.retry_policy,
                self.hooks.as_ref(),
                move |_| self.transport.stream(wire_request.clone(), auth.clone()),
                Delay::new,
            )
            .await?;

            let stream = try_stream! {
                while let Some(chunk) = chunks.next().await {
                    yield StreamEvent::from(chunk?);
                }
            };

            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move {
            let auth = self.auth()?;

            execute_with_retry(
                self.id,
                ProviderOperation::ListModels,
                &RetryPolicy::disabled(),
                self.hooks.as_ref(),
                move |_| self.transport.list_models(auth.clone()),
                Delay::new,
            )
            .await
        })
    }
}
