//! BoxGenerationProvider -- object-safe dynamic dispatch wrapper for GenerationProvider.
//!
//! 1. Define an object-safe `GenerationProviderDyn` trait with boxed futures
//! 2. Blanket-impl `GenerationProviderDyn` for all `T: GenerationProvider`
//! 3. `BoxGenerationProvider` wraps `Box<dyn GenerationProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use remix_types::error::GenerationError;
use remix_types::generation::{FinalPrompt, GenerationReply};
use remix_types::platform::Platform;

use super::provider::GenerationProvider;

/// Object-safe version of [`GenerationProvider`] with boxed futures.
pub trait GenerationProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> Option<&str>;

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a FinalPrompt,
        platform: Platform,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationReply, GenerationError>> + Send + 'a>>;
}

impl<T: GenerationProvider> GenerationProviderDyn for T {
    fn name(&self) -> &str {
        GenerationProvider::name(self)
    }

    fn model(&self) -> Option<&str> {
        GenerationProvider::model(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a FinalPrompt,
        platform: Platform,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationReply, GenerationError>> + Send + 'a>> {
        Box::pin(self.generate(prompt, platform))
    }
}

/// Type-erased generation provider for runtime selection between the direct
/// Anthropic client and the remote `/remix` client.
///
/// Since `GenerationProvider` uses RPITIT, it cannot be used as a trait
/// object directly; this wrapper provides equivalent inherent methods.
pub struct BoxGenerationProvider {
    inner: Box<dyn GenerationProviderDyn + Send + Sync>,
}

impl BoxGenerationProvider {
    /// Wrap a concrete `GenerationProvider` in a type-erased box.
    pub fn new<T: GenerationProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn model(&self) -> Option<&str> {
        self.inner.model()
    }

    /// Send one prompt and return the provider's raw text.
    pub async fn generate(
        &self,
        prompt: &FinalPrompt,
        platform: Platform,
    ) -> Result<GenerationReply, GenerationError> {
        self.inner.generate_boxed(prompt, platform).await
    }
}
