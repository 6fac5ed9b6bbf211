//! Data directory layout.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "REMIX_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `REMIX_DATA_DIR`
/// 2. `~/.remix`
/// 3. `./.remix` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".remix");
    }

    PathBuf::from(".remix")
}

/// Create the data directory if it does not exist yet.
pub async fn ensure_data_dir(data_dir: &Path) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(data_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_data_dir_default_name() {
        if std::env::var_os(DATA_DIR_ENV).is_none() {
            assert!(resolve_data_dir().ends_with(".remix"));
        }
    }

    #[tokio::test]
    async fn test_ensure_data_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");

        ensure_data_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op.
        ensure_data_dir(&nested).await.unwrap();
    }
}
