//! AnthropicProvider -- concrete [`GenerationProvider`] for the Anthropic
//! Messages API (`/v1/messages`).
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the request headers. It never appears in logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use remix_core::generation::provider::GenerationProvider;
use remix_types::error::GenerationError;
use remix_types::generation::{FinalPrompt, GenerationReply, SEGMENT_SENTINEL};
use remix_types::platform::Platform;

use super::types::{ErrorEnvelope, MessageParam, MessagesRequest, MessagesResponse};

/// System prompt sent with every generation for `platform`.
///
/// Asks for ready-to-post text only and names the separator the segmenter
/// splits on.
pub fn system_prompt(platform: Platform) -> String {
    let (unit, destination) = match platform {
        Platform::Twitter => ("tweet", "Twitter/X"),
        Platform::LinkedIn => ("LinkedIn post", "LinkedIn"),
    };
    format!(
        "You are a creative writing assistant that helps create {units}. \
         Provide only the exact {unit} text without any labels, numbers, or prefixes. \
         The output should be ready to post directly to {destination}. \
         Keep each {unit} within {limit} characters. \
         When writing more than one, separate them with {SEGMENT_SENTINEL} and nothing else.",
        units = platform.plural_label(),
        limit = platform.char_limit(),
    )
}

/// Anthropic Claude generation provider.
///
/// Does not derive `Debug`; the key lives in a [`SecretString`] regardless.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";

    /// Create a provider for `model`. `timeout` bounds each request.
    pub fn new(
        api_key: SecretString,
        model: String,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model,
            max_tokens: 1024,
        })
    }

    /// Override the base URL (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn to_request(&self, prompt: &FinalPrompt, platform: Platform) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: Some(system_prompt(platform)),
            messages: vec![MessageParam {
                role: "user".to_string(),
                content: prompt.as_str().to_string(),
            }],
        }
    }

    /// Send one request and decode the reply text.
    async fn send(&self, body: &MessagesRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.url("/v1/messages"))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(decode_error(status.as_u16(), &raw));
        }

        let parsed: MessagesResponse = serde_json::from_str(&raw).map_err(|e| {
            GenerationError::MalformedResponse(format!("unexpected response shape: {e}"))
        })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                id = parsed.id.as_deref().unwrap_or(""),
                stop_reason = parsed.stop_reason.as_deref().unwrap_or(""),
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Anthropic response"
            );
        }

        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(GenerationError::MalformedResponse(
                "response contained no text content".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Map a non-2xx body to a provider error, keeping the provider's own code.
fn decode_error(status: u16, raw: &str) -> GenerationError {
    match serde_json::from_str::<ErrorEnvelope>(raw) {
        Ok(envelope) => GenerationError::Provider {
            status: Some(status),
            code: Some(envelope.error.error_type),
            message: envelope.error.message,
        },
        Err(_) => GenerationError::Provider {
            status: Some(status),
            code: None,
            message: raw.to_string(),
        },
    }
}

impl GenerationProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }

    async fn generate(
        &self,
        prompt: &FinalPrompt,
        platform: Platform,
    ) -> Result<GenerationReply, GenerationError> {
        let body = self.to_request(prompt, platform);
        self.send(&body).await.map(GenerationReply::new)
    }
}
