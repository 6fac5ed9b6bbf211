//! Saved-post repository trait definition (the Curation Store port).

use remix_types::error::RepositoryError;
use remix_types::platform::Platform;
use remix_types::post::{NewPost, OwnerId, PostId, SavedPost};

/// Filter criteria for listing saved posts.
///
/// Results are always ordered newest first (`created_at` descending).
#[derive(Debug, Clone)]
pub struct PostFilter {
    /// Platform the posts were written for.
    pub platform: Platform,
    /// Restrict to one owner's posts.
    pub owner_id: Option<OwnerId>,
    /// Maximum number of results.
    pub limit: Option<i64>,
}

impl PostFilter {
    /// All posts for `platform`, any owner, unbounded.
    pub fn platform(platform: Platform) -> Self {
        Self {
            platform,
            owner_id: None,
            limit: None,
        }
    }

    pub fn owned_by(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}

/// Repository trait for saved-post persistence.
///
/// The repository is the only source of truth for saved posts and the only
/// place a [`PostId`] is minted. Every operation is atomic per record.
///
/// Implementations live in remix-infra (e.g., SqlitePostRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait PostRepository: Send + Sync {
    /// Persist a new post, assigning its id and timestamps.
    fn create(
        &self,
        post: &NewPost,
    ) -> impl std::future::Future<Output = Result<SavedPost, RepositoryError>> + Send;

    /// Get a post by its id.
    fn get(
        &self,
        id: &PostId,
    ) -> impl std::future::Future<Output = Result<Option<SavedPost>, RepositoryError>> + Send;

    /// List posts matching the filter, newest first.
    fn list(
        &self,
        filter: &PostFilter,
    ) -> impl std::future::Future<Output = Result<Vec<SavedPost>, RepositoryError>> + Send;

    /// Replace a post's content. Fails with `NotFound` if the id is unknown.
    fn update(
        &self,
        id: &PostId,
        content: &str,
    ) -> impl std::future::Future<Output = Result<SavedPost, RepositoryError>> + Send;

    /// Permanently delete a post. Fails with `NotFound` if the id is unknown.
    fn delete(
        &self,
        id: &PostId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
