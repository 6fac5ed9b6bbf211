//! SQLite saved-post repository.
//!
//! Implements `PostRepository` from `remix-core` using sqlx with split
//! read/write pools. Ids are minted here and nowhere else.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use remix_core::repository::post::{PostFilter, PostRepository};
use remix_types::error::RepositoryError;
use remix_types::platform::Platform;
use remix_types::post::{NewPost, OwnerId, PostId, SavedPost};

use super::pool::DatabasePool;

const COLUMNS: &str = "id, content, platform, owner_id, created_at, updated_at";

/// SQLite-backed implementation of `PostRepository`.
#[derive(Clone)]
pub struct SqlitePostRepository {
    pool: DatabasePool,
}

impl SqlitePostRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn map_sqlx(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

/// Fixed-width UTC timestamp, so string order equals time order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn post_from_row(row: &SqliteRow) -> Result<SavedPost, RepositoryError> {
    let id: String = row.try_get("id").map_err(map_sqlx)?;
    let platform: String = row.try_get("platform").map_err(map_sqlx)?;
    let owner_id: String = row.try_get("owner_id").map_err(map_sqlx)?;
    let created_at: String = row.try_get("created_at").map_err(map_sqlx)?;
    let updated_at: String = row.try_get("updated_at").map_err(map_sqlx)?;

    Ok(SavedPost {
        id: id
            .parse::<PostId>()
            .map_err(|e| RepositoryError::Query(format!("invalid post id: {e}")))?,
        content: row.try_get("content").map_err(map_sqlx)?,
        platform: platform.parse::<Platform>().map_err(RepositoryError::Query)?,
        owner_id: OwnerId::new(owner_id),
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

impl PostRepository for SqlitePostRepository {
    async fn create(&self, post: &NewPost) -> Result<SavedPost, RepositoryError> {
        let now = Utc::now().trunc_subsecs(6);
        let saved = SavedPost {
            id: PostId::new(),
            content: post.content.clone(),
            platform: post.platform,
            owner_id: post.owner_id.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO saved_posts (id, content, platform, owner_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(saved.id.to_string())
        .bind(&saved.content)
        .bind(saved.platform.to_string())
        .bind(saved.owner_id.as_str())
        .bind(format_datetime(&saved.created_at))
        .bind(format_datetime(&saved.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        tracing::debug!(id = %saved.id, platform = %saved.platform, "Inserted saved post");
        Ok(saved)
    }

    async fn get(&self, id: &PostId) -> Result<Option<SavedPost>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM saved_posts WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<SavedPost>, RepositoryError> {
        let mut sql = format!("SELECT {COLUMNS} FROM saved_posts WHERE platform = ?");
        if filter.owner_id.is_some() {
            sql.push_str(" AND owner_id = ?");
        }
        // UUID v7 ids are time-ordered, so they break created_at ties.
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit.max(0)));
        }

        let mut query = sqlx::query(&sql).bind(filter.platform.to_string());
        if let Some(owner) = &filter.owner_id {
            query = query.bind(owner.as_str());
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        rows.iter().map(post_from_row).collect()
    }

    async fn update(&self, id: &PostId, content: &str) -> Result<SavedPost, RepositoryError> {
        let row = sqlx::query(&format!(
            "UPDATE saved_posts SET content = ?, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(content)
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: &PostId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM saved_posts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn new_post(content: &str, platform: Platform, owner: &str) -> NewPost {
        NewPost {
            content: content.to_string(),
            platform,
            owner_id: OwnerId::new(owner),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = SqlitePostRepository::new(test_pool().await);

        let created = repo
            .create(&new_post("hello world", Platform::Twitter, "alice"))
            .await
            .unwrap();
        let found = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.created_at, found.updated_at);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let repo = SqlitePostRepository::new(test_pool().await);
        assert!(repo.get(&PostId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_platform_and_orders_newest_first() {
        let repo = SqlitePostRepository::new(test_pool().await);

        let first = repo
            .create(&new_post("first", Platform::Twitter, "alice"))
            .await
            .unwrap();
        repo.create(&new_post("long form", Platform::LinkedIn, "alice"))
            .await
            .unwrap();
        let second = repo
            .create(&new_post("second", Platform::Twitter, "alice"))
            .await
            .unwrap();

        let tweets = repo
            .list(&PostFilter::platform(Platform::Twitter))
            .await
            .unwrap();
        let ids: Vec<PostId> = tweets.iter().map(|p| p.id).collect();
        assert_eq!(ids, [second.id, first.id]);
        assert!(tweets.iter().all(|p| p.platform == Platform::Twitter));

        let linkedin = repo
            .list(&PostFilter::platform(Platform::LinkedIn))
            .await
            .unwrap();
        assert_eq!(linkedin.len(), 1);
        assert_eq!(linkedin[0].content, "long form");
    }

    #[tokio::test]
    async fn test_list_by_owner_and_limit() {
        let repo = SqlitePostRepository::new(test_pool().await);
        for i in 0..3 {
            repo.create(&new_post(&format!("a{i}"), Platform::Twitter, "alice"))
                .await
                .unwrap();
        }
        repo.create(&new_post("b", Platform::Twitter, "bob"))
            .await
            .unwrap();

        let bobs = repo
            .list(&PostFilter::platform(Platform::Twitter).owned_by(OwnerId::new("bob")))
            .await
            .unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].content, "b");

        let mut filter = PostFilter::platform(Platform::Twitter).owned_by(OwnerId::new("alice"));
        filter.limit = Some(2);
        let page = repo.list(&filter).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].content, "a2");
    }

    #[tokio::test]
    async fn test_update_changes_content_keeps_id() {
        let repo = SqlitePostRepository::new(test_pool().await);
        let created = repo
            .create(&new_post("draft", Platform::LinkedIn, "alice"))
            .await
            .unwrap();

        let updated = repo.update(&created.id, "final").await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.content, "final");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let again = repo.update(&created.id, "final").await.unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(again.content, "final");

        let listed = repo
            .list(&PostFilter::platform(Platform::LinkedIn))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "final");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = SqlitePostRepository::new(test_pool().await);
        let err = repo.update(&PostId::new(), "x").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let repo = SqlitePostRepository::new(test_pool().await);
        let created = repo
            .create(&new_post("bye", Platform::Twitter, "alice"))
            .await
            .unwrap();

        repo.delete(&created.id).await.unwrap();
        let listed = repo
            .list(&PostFilter::platform(Platform::Twitter))
            .await
            .unwrap();
        assert!(listed.iter().all(|p| p.id != created.id));

        let err = repo.delete(&created.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_closed_pool_is_connection_error() {
        let pool = test_pool().await;
        let repo = SqlitePostRepository::new(pool.clone());
        pool.close().await;

        let err = repo
            .list(&PostFilter::platform(Platform::Twitter))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Connection));
    }

    #[test]
    fn test_datetime_format_is_fixed_width() {
        let a = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let b = DateTime::parse_from_rfc3339("2025-01-01T00:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);
        let (fa, fb) = (format_datetime(&a), format_datetime(&b));
        assert_eq!(fa, "2025-01-01T00:00:00.000000Z");
        assert_eq!(fa.len(), fb.len());
        assert!(fa < fb);
    }
}
