//! Saved-post service.
//!
//! Stateless use cases over the saved collection for surfaces that act on
//! one request at a time (REST handlers, one-shot CLI commands). Validates
//! content, scopes every lookup to an owner, and maps repository failures
//! onto [`CurationError`]. Session-level review state lives in
//! [`CurationController`](super::curation::CurationController) instead.

use remix_types::error::CurationError;
use remix_types::platform::Platform;
use remix_types::post::{NewPost, OwnerId, PostId, SavedPost};

use crate::repository::post::{PostFilter, PostRepository};

pub struct PostService<R: PostRepository> {
    repo: R,
}

fn validate_content(content: &str) -> Result<(), CurationError> {
    if content.trim().is_empty() {
        return Err(CurationError::InvalidInput(
            "post content cannot be empty".to_string(),
        ));
    }
    Ok(())
}

impl<R: PostRepository> PostService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Save `content` as a new post for `owner`.
    pub async fn save(
        &self,
        content: &str,
        platform: Platform,
        owner: &OwnerId,
    ) -> Result<SavedPost, CurationError> {
        validate_content(content)?;
        let post = NewPost {
            content: content.to_string(),
            platform,
            owner_id: owner.clone(),
        };
        Ok(self.repo.create(&post).await?)
    }

    /// Fetch one post. Posts belonging to another owner are reported as
    /// missing.
    pub async fn get(&self, id: &PostId, owner: &OwnerId) -> Result<SavedPost, CurationError> {
        match self.repo.get(id).await? {
            Some(post) if post.owner_id == *owner => Ok(post),
            _ => Err(CurationError::NotFound),
        }
    }

    /// `owner`'s posts for `platform`, newest first.
    pub async fn list(
        &self,
        platform: Platform,
        owner: &OwnerId,
        limit: Option<i64>,
    ) -> Result<Vec<SavedPost>, CurationError> {
        let mut filter = PostFilter::platform(platform).owned_by(owner.clone());
        filter.limit = limit;
        Ok(self.repo.list(&filter).await?)
    }

    /// Replace a post's content, keeping its id.
    pub async fn update(
        &self,
        id: &PostId,
        content: &str,
        owner: &OwnerId,
    ) -> Result<SavedPost, CurationError> {
        validate_content(content)?;
        self.get(id, owner).await?;
        Ok(self.repo.update(id, content).await?)
    }

    pub async fn delete(&self, id: &PostId, owner: &OwnerId) -> Result<(), CurationError> {
        self.get(id, owner).await?;
        Ok(self.repo.delete(id).await?)
    }
}
