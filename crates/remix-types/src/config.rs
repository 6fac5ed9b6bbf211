//! Global configuration types.
//!
//! `GlobalConfig` represents the top-level `config.toml` in the data
//! directory. Every field has a default so an empty or missing file works.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub prompts: PromptTemplates,

    #[serde(default)]
    pub server: ServerConfig,

    /// Owner recorded on saved posts when the caller does not name one.
    #[serde(default = "default_owner_id")]
    pub owner_id: String,

    /// How long "just saved" feedback stays visible, in milliseconds.
    #[serde(default = "default_feedback_window_ms")]
    pub feedback_window_ms: u64,
}

fn default_owner_id() -> String {
    "local".to_string()
}

fn default_feedback_window_ms() -> u64 {
    1_500
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            prompts: PromptTemplates::default(),
            server: ServerConfig::default(),
            owner_id: default_owner_id(),
            feedback_window_ms: default_feedback_window_ms(),
        }
    }
}

/// How generation requests reach the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Call the Anthropic Messages API directly (needs an API key).
    Anthropic,
    /// Forward through a running `remix serve` instance's `/remix` endpoint.
    Remote,
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::Anthropic
    }
}

/// Generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Override for the Anthropic API base URL (proxies, tests).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Base URL of the `remix serve` instance used when `kind = "remote"`.
    #[serde(default = "default_remote_url")]
    pub remote_url: String,

    /// Per-request timeout for the generation call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_remote_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            base_url: None,
            remote_url: default_remote_url(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Per-platform prompt template overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptTemplates {
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
}

impl PromptTemplates {
    /// The configured template for `platform`, or the built-in default.
    pub fn template_for(&self, platform: Platform) -> &str {
        let configured = match platform {
            Platform::Twitter => self.twitter.as_deref(),
            Platform::LinkedIn => self.linkedin.as_deref(),
        };
        configured.unwrap_or_else(|| platform.default_template())
    }
}

/// HTTP server settings for `remix serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
