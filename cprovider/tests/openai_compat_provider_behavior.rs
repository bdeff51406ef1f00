#![cfg(feature = "provider-openai-compat")]

use std::sync::{Arc, Mutex};

use cprovider::openai_compat::{
    OpenAiCompatAuth, OpenAiCompatChunk, OpenAiCompatChunkStream, OpenAiCompatProvider,
    OpenAiCompatRequest, OpenAiCompatTransport,
};
use cprovider::{
    FinishReason, ListingSource, Message, ModelCatalog, ModelProvider, ModelRequest,
    ProviderError, ProviderFuture, ProviderId, Role, SecureCredentialManager, StreamAccumulator,
    TokenUsage, ToolCall, ToolDefinition,
};
use futures_util::{StreamExt, stream};

#[derive(Debug, Default)]
struct FakeTransport {
    captured_request: Mutex<Option<OpenAiCompatRequest>>,
    models: Vec<String>,
}

impl OpenAiCompatTransport for FakeTransport {
    fn stream<'a>(
        &'a self,
        request: OpenAiCompatRequest,
        _auth: OpenAiCompatAuth,
    ) -> ProviderFuture<'a, Result<OpenAiCompatChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            *self.captured_request.lock().expect("request lock") = Some(request);

            let chunks = vec![
                Ok(OpenAiCompatChunk::ContentDelta("Hel".to_string())),
                Ok(OpenAiCompatChunk::ContentDelta("lo ".to_string())),
                Ok(OpenAiCompatChunk::ContentDelta("world".to_string())),
                Ok(OpenAiCompatChunk::Usage(TokenUsage {
                    input_tokens: 9,
                    output_tokens: 3,
                    total_tokens: 12,
                })),
                Ok(OpenAiCompatChunk::Finish(FinishReason::Stop)),
            ];
            Ok(Box::pin(stream::iter(chunks)) as OpenAiCompatChunkStream<'a>)
        })
    }

    fn list_models<'a>(
        &'a self,
        _auth: OpenAiCompatAuth,
    ) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        let models = self.models.clone();
        Box::pin(async move { Ok(models) })
    }
}

fn provider(transport: Arc<FakeTransport>) -> OpenAiCompatProvider {
    let credentials = SecureCredentialManager::new()
        .with_api_key(ProviderId::Venice, "venice-key")
        .expect("key should store");
    OpenAiCompatProvider::new(ProviderId::Venice, Arc::new(credentials), transport)
}

#[tokio::test]
async fn streamed_text_is_reassembled_with_usage() {
    let transport = Arc::new(FakeTransport::default());
    let provider = provider(Arc::clone(&transport));

    let request = ModelRequest::builder("llama-3.3-70b")
        .message(Message::new(Role::User, "say hello"))
        .tools(vec![ToolDefinition {
            name: "generate_uuid".to_string(),
            description: "Generate a UUID".to_string(),
            input_schema: "{\"type\":\"object\",\"properties\":{}}".to_string(),
        }])
        .enable_streaming()
        .build()
        .expect("request should build");

    let mut events = provider.stream(request).await.expect("stream opens");
    let mut accumulator = StreamAccumulator::new();
    let mut deltas = Vec::new();
    while let Some(event) = events.next().await {
        if let Some(chunk) = accumulator.feed(event.expect("event")).expect("feed")
            && !chunk.is_final
        {
            deltas.push(chunk.content);
        }
    }
    drop(events);

    assert_eq!(deltas, vec!["Hel", "lo ", "world"]);
    let completion = accumulator.into_completion().expect("completion");
    assert_eq!(completion.content, "Hello world");
    assert_eq!(completion.finish_reason, FinishReason::Stop);
    assert_eq!(completion.usage.map(|usage| usage.total_tokens), Some(12));
    assert_eq!(completion.tool_calls, Vec::<ToolCall>::new());

    let captured = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request captured");
    assert_eq!(captured.model, "llama-3.3-70b");
    assert_eq!(captured.tools.len(), 1);
    assert!(captured.include_usage);
}

#[tokio::test]
async fn catalog_lists_models_through_the_provider() {
    let transport = Arc::new(FakeTransport {
        models: vec![
            "venice-uncensored".to_string(),
            "llama-3.3-70b".to_string(),
            "mistral-31-24b".to_string(),
        ],
        ..FakeTransport::default()
    });
    let catalog = ModelCatalog::new(ProviderId::Venice).with_source(Arc::new(provider(transport)));

    let listing = catalog.list_models().await;
    assert_eq!(listing.source, ListingSource::Live);
    assert_eq!(
        listing
            .models
            .iter()
            .map(|model| (model.id.as_str(), model.supports_tools))
            .collect::<Vec<_>>(),
        vec![
            ("llama-3.3-70b", true),
            ("mistral-31-24b", true),
            ("venice-uncensored", false),
        ]
    );

    let uncensored = catalog
        .validate_model("venice-uncensored")
        .await
        .expect("listed model validates");
    assert_eq!(uncensored.description, "NSFW uncensored chat (no function calling)");
    assert_eq!(catalog.best_tool_model(), "");
}
