//! Generation provider implementations.
//!
//! Contains the concrete [`GenerationProvider`] implementations: the direct
//! Anthropic client and the remote `/remix` client. Also provides the
//! factory ([`create_provider`]) that picks one from a [`ProviderConfig`],
//! and a connectivity check ([`check_provider`]).
//!
//! [`GenerationProvider`]: remix_core::generation::provider::GenerationProvider

pub mod anthropic;
pub mod remote;

use std::time::Duration;

use secrecy::SecretString;
use tracing::info;

use remix_core::generation::box_provider::BoxGenerationProvider;
use remix_core::prompt;
use remix_types::config::{ProviderConfig, ProviderKind};
use remix_types::error::GenerationError;
use remix_types::generation::GenerationReply;
use remix_types::platform::Platform;

use self::anthropic::AnthropicProvider;
use self::remote::RemoteRemixProvider;

/// Prompt sent by [`check_provider`].
pub const CHECK_PROMPT: &str = "Say hello!";

/// Create a [`BoxGenerationProvider`] from a [`ProviderConfig`].
///
/// `api_key` is only consulted for the Anthropic provider.
///
/// # Errors
///
/// Fails with an `authentication_error` provider error, before any request
/// is made, when the Anthropic provider is selected without a key.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: Option<&str>,
) -> Result<BoxGenerationProvider, GenerationError> {
    let timeout = Duration::from_secs(config.timeout_secs);

    match config.kind {
        ProviderKind::Anthropic => {
            let key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| GenerationError::Provider {
                    status: None,
                    code: Some("authentication_error".to_string()),
                    message: format!("no API key found; set {}", config.api_key_env),
                })?;
            let mut provider =
                AnthropicProvider::new(SecretString::from(key.to_string()), config.model.clone(), timeout)?
                    .with_max_tokens(config.max_tokens);
            if let Some(base_url) = config.base_url.as_deref() {
                provider = provider.with_base_url(base_url);
            }
            info!(provider = "anthropic", model = %config.model, "Generation provider ready");
            Ok(BoxGenerationProvider::new(provider))
        }
        ProviderKind::Remote => {
            let provider = RemoteRemixProvider::new(&config.remote_url, timeout)?;
            info!(provider = "remote", endpoint = provider.endpoint(), "Generation provider ready");
            Ok(BoxGenerationProvider::new(provider))
        }
    }
}

/// Send a minimal prompt to verify the provider is reachable and
/// authenticated. Returns the provider's reply.
pub async fn check_provider(
    provider: &BoxGenerationProvider,
) -> Result<GenerationReply, GenerationError> {
    let prompt = prompt::build(CHECK_PROMPT, prompt::TEXT_PLACEHOLDER)?;
    provider.generate(&prompt, Platform::default()).await
}
