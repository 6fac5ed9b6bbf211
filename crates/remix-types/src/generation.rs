//! Generation request/reply types and the `/remix` wire bodies.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Literal delimiter between posts in a provider reply.
///
/// Shared by the provider system prompt (which asks for it) and the
/// segmenter (which splits on it); both sides must agree.
pub const SEGMENT_SENTINEL: &str = "|||";

/// One user-initiated generation cycle's input. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub source_text: String,
    pub prompt_template: String,
    pub platform: Platform,
}

impl GenerationRequest {
    pub fn new(
        source_text: impl Into<String>,
        prompt_template: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            prompt_template: prompt_template.into(),
            platform,
        }
    }
}

/// A rendered prompt, ready to send to the provider.
///
/// Keeps the parts it was built from so a client forwarding through the
/// `/remix` boundary can send `{text, prompt}` instead of the rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalPrompt {
    text: String,
    source_text: String,
    template: String,
}

impl FinalPrompt {
    /// Assemble a prompt from an already-rendered text. Validation lives in
    /// `remix_core::prompt::build`, which is the intended constructor.
    pub fn from_parts(text: String, source_text: String, template: String) -> Self {
        Self {
            text,
            source_text,
            template,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

/// Raw text returned by the provider for one request. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReply(pub String);

impl GenerationReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Request body of `POST /remix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemixRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub platform: Platform,
}

/// Success body of `POST /remix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemixResponse {
    #[serde(rename = "remixedText")]
    pub remixed_text: String,
}

/// Failure body of `POST /remix`.
///
/// `type` carries the error kind (`invalid_input`, `network_error`,
/// `malformed_response`) or the provider's own error code; `status` carries
/// the provider's HTTP status when there was one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemixErrorBody {
    pub message: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}
