//! Query parameter extractors for list endpoints.

use serde::Deserialize;

/// Query parameters for the saved-post list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct PostListQuery {
    /// Platform to list (`twitter`, `linkedin`). Defaults to twitter.
    pub platform: Option<String>,
    /// Maximum results.
    pub limit: Option<i64>,
}
