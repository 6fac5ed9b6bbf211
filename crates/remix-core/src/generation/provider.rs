//! GenerationProvider trait definition.
//!
//! The port through which the pipeline reaches the text-generation
//! provider. Implementations live in remix-infra.

use remix_types::error::GenerationError;
use remix_types::generation::{FinalPrompt, GenerationReply};
use remix_types::platform::Platform;

/// Trait for generation clients.
///
/// One call is exactly one outbound request: no retry, no caching. The
/// platform hint selects the system prompt that conditions the provider;
/// it never changes the user prompt.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait GenerationProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic", "remote").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to, when the client knows it.
    fn model(&self) -> Option<&str> {
        None
    }

    /// Send one prompt and return the provider's raw text.
    fn generate(
        &self,
        prompt: &FinalPrompt,
        platform: Platform,
    ) -> impl std::future::Future<Output = Result<GenerationReply, GenerationError>> + Send;
}
