//! Transport trait and reqwest-based HTTP implementation for chat-completions backends.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};

use crate::{ProviderError, ProviderFuture};

use super::serde_api::{
    SseDecoder, SseFrame, build_api_request, decode_model_listing, decode_stream_payload,
    extract_error_message,
};
use super::types::{OpenAiCompatAuth, OpenAiCompatChunk, OpenAiCompatRequest};

pub type OpenAiCompatChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<OpenAiCompatChunk, ProviderError>> + Send + 'a>>;

pub trait OpenAiCompatTransport: Send + Sync + std::fmt::Debug {
    fn stream<'a>(
        &'a self,
        request: OpenAiCompatRequest,
        auth: OpenAiCompatAuth,
    ) -> ProviderFuture<'a, Result<OpenAiCompatChunkStream<'a>, ProviderError>>;

    fn list_models<'a>(
        &'a self,
        auth: OpenAiCompatAuth,
    ) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiCompatHttpTransport {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn apply_auth(
        &self,
        builder: reqwest::RequestBuilder,
        auth: &OpenAiCompatAuth,
    ) -> reqwest::RequestBuilder {
        match &auth.api_key {
            Some(key) => builder.bearer_auth(key.expose()),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Response, ProviderError> {
        let response = builder.send().await.map_err(|err| {
            if err.is_timeout() {
                ProviderError::timeout(err.to_string())
            } else {
                ProviderError::transport(err.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(parse_error(response).await);
        }

        Ok(response)
    }
}

async fn parse_error(response: Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body)
        .unwrap_or_else(|| format!("chat backend request failed with status {status}"));

    error_for_status(status, message)
}

pub(crate) fn error_for_status(status: StatusCode, message: String) -> ProviderError {
    ProviderError::from_status(status.as_u16(), message)
}

/// Holds a finish reason back until the body closes, so a trailing usage
/// block is delivered before the terminal event.
#[derive(Debug, Default)]
pub(crate) struct ChunkSequencer {
    pending_finish: Option<OpenAiCompatChunk>,
}

impl ChunkSequencer {
    pub(crate) fn accept(&mut self, chunks: Vec<OpenAiCompatChunk>) -> Vec<OpenAiCompatChunk> {
        let mut ready = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            match chunk {
                OpenAiCompatChunk::Finish(_) => self.pending_finish = Some(chunk),
                other => ready.push(other),
            }
        }
        ready
    }

    pub(crate) fn close(&mut self) -> Option<OpenAiCompatChunk> {
        self.pending_finish.take()
    }
}

impl OpenAiCompatTransport for OpenAiCompatHttpTransport {
    fn stream<'a>(
        &'a self,
        request: OpenAiCompatRequest,
        auth: OpenAiCompatAuth,
    ) -> ProviderFuture<'a, Result<OpenAiCompatChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            let api_request = build_api_request(request)?;
            let builder = self
                .client
                .post(self.endpoint("chat/completions"))
                .json(&api_request);
            let response = self.send(self.apply_auth(builder, &auth)).await?;

            let stream = try_stream! {
                let mut body = response.bytes_stream();
                let mut decoder = SseDecoder::default();
                let mut sequencer = ChunkSequencer::default();
                let mut done = false;

                while let Some(item) = body.next().await {
                    let bytes = item.map_err(|err| ProviderError::transport(err.to_string()))?;

                    for frame in decoder.push(&bytes)? {
                        match frame {
                            SseFrame::Done => {
                                done = true;
                                break;
                            }
                            SseFrame::Data(payload) => {
                                for chunk in sequencer.accept(decode_stream_payload(&payload)?) {
                                    yield chunk;
                                }
                            }
                        }
                    }

                    if done {
                        break;
                    }
                }

                if !done {
                    if let Some(SseFrame::Data(payload)) = decoder.finish()? {
                        for chunk in sequencer.accept(decode_stream_payload(&payload)?) {
                            yield chunk;
                        }
                    }
                }

                if let Some(finish) = sequencer.close() {
                    yield finish;
                }
            };

            Ok(Box::pin(stream) as OpenAiCompatChunkStream<'a>)
        })
    }

    fn list_models<'a>(
        &'a self,
        auth: OpenAiCompatAuth,
    ) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move {
            let builder = self.client.get(self.endpoint("models"));
            let response = self.send(self.apply_auth(builder, &auth)).await?;
            let body = response
                .text()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            decode_model_listing(&body)
        })
    }
}
