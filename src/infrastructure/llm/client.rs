//! HTTP client for the Anthropic Messages API.
//!
//! Handles request construction, authentication headers, and transient
//! error retry. Non-streaming: the chat endpoint returns one reply per
//! request, so SSE is not needed here.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::warn;

use super::types::{ApiErrorResponse, ChatTurn, MessageRequest, MessageResponse};

/// Base URL for the Anthropic Messages API.
const API_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// Default model identifier.
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

/// Upper bound on reply tokens per request.
const MAX_TOKENS: u32 = 1024;

/// Errors raised by the provider client
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client-side configuration problem (bad key material, builder failure)
    #[error("LLM client configuration error: {0}")]
    Config(String),

    /// The provider rejected the request or the transport failed
    #[error("LLM provider error: {0}")]
    Provider(String),
}

/// HTTP client for Anthropic API communication.
///
/// Retries once on transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    model: String,
    max_retries: u32,
    base_url: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic API client.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key for authentication
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&api_key)
                .map_err(|e| LlmError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            max_retries: 1,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends a conversation and returns the assistant's reply text.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second
    /// delay.
    pub async fn complete(
        &self,
        system: &str,
        messages: &[ChatTurn],
    ) -> Result<String, LlmError> {
        let request = MessageRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system.to_string(),
            messages: messages.to_vec(),
        };

        let mut last_error = LlmError::Provider("no attempt made".to_string());

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying chat request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(&request)
                .send()
                .await
                .map_err(|e| LlmError::Provider(format!("HTTP request failed: {e}")))?;

            let status = response.status();
            if status.is_success() {
                let body: MessageResponse = response
                    .json()
                    .await
                    .map_err(|e| LlmError::Provider(format!("malformed response body: {e}")))?;
                return Ok(body.text());
            }

            let message = match response.json::<ApiErrorResponse>().await {
                Ok(err) => format!("{} ({})", err.error.message, err.error.kind),
                Err(_) => format!("HTTP {status}"),
            };

            if matches!(status.as_u16(), 429 | 500 | 503) {
                last_error = LlmError::Provider(message);
                continue;
            }
            return Err(LlmError::Provider(message));
        }

        Err(last_error)
    }
}
