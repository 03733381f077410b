use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::decode::StreamDecoder;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Errors surfaced by [`StreamClient::send`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The response cannot carry a body (HTTP 204 No Content).
    #[error("no response body")]
    NoResponseBody,
    /// Connection, request, or mid-stream read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for a chat backend that streams its reply as plain text.
#[derive(Clone)]
pub struct StreamClient {
    client: Client,
    base_url: String,
}

impl StreamClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST the message and deliver the reply to `on_chunk` as it streams in.
    ///
    /// One request per call: no retry, no timeout. `on_chunk` runs strictly in
    /// arrival order and only with non-empty text. A non-2xx status is not
    /// special-cased; whatever body the server sends streams through as the
    /// reply text.
    pub async fn send(
        &self,
        message: &str,
        mut on_chunk: impl FnMut(&str),
    ) -> Result<(), ClientError> {
        let url = format!("{}/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Err(ClientError::NoResponseBody);
        }

        let mut stream = response.bytes_stream();
        let mut decoder = StreamDecoder::new();

        while let Some(chunk) = stream.next().await {
            let text = decoder.feed(&chunk?);
            if !text.is_empty() {
                on_chunk(&text);
            }
        }

        // A stream truncated inside a character still yields its U+FFFD.
        let tail = decoder.finish();
        if !tail.is_empty() {
            on_chunk(&tail);
        }

        Ok(())
    }
}
