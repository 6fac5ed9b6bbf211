//! Global configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.remix/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::Path;

use remix_types::config::{GlobalConfig, ProviderConfig};

/// Environment variable that overrides the SQLite database URL.
pub const DATABASE_URL_ENV: &str = "REMIX_DATABASE_URL";

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`GlobalConfig::default()`].
/// - Unreadable or unparsable file: a warning, then the default.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Read the provider API key from the environment variable the config names.
///
/// Empty values count as unset.
pub fn resolve_api_key(config: &ProviderConfig) -> Option<String> {
    std::env::var(&config.api_key_env)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// SQLite URL for the saved-post database.
///
/// `REMIX_DATABASE_URL` wins; otherwise `{data_dir}/remix.db`.
pub fn database_url(data_dir: &Path) -> String {
    match std::env::var(DATABASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => url,
        _ => default_database_url(data_dir),
    }
}

fn default_database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("remix.db").display())
}
