//! Saved-post CRUD handlers.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use remix_types::error::CurationError;
use remix_types::platform::Platform;
use remix_types::post::{PostId, SavedPost};

use crate::http::error::AppError;
use crate::http::extractors::owner::Owner;
use crate::http::extractors::query::PostListQuery;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
    pub content: String,
    #[serde(default)]
    pub platform: Platform,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostBody {
    pub content: String,
}

/// Unparseable ids cannot name an existing post.
fn parse_id(raw: &str) -> Result<PostId, AppError> {
    raw.parse().map_err(|_| AppError::Curation(CurationError::NotFound))
}

fn self_link(post: &SavedPost) -> String {
    format!("/api/v1/posts/{}", post.id)
}

/// GET /api/v1/posts - List the owner's posts for one platform, newest first.
pub async fn list_posts(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Query(query): Query<PostListQuery>,
) -> Result<Json<ApiResponse<Vec<SavedPost>>>, AppError> {
    let start = Instant::now();

    let platform = match &query.platform {
        Some(p) => p.parse::<Platform>().map_err(AppError::Validation)?,
        None => Platform::default(),
    };
    if query.limit.is_some_and(|l| l < 0) {
        return Err(AppError::Validation("limit cannot be negative".to_string()));
    }

    let posts = state
        .post_service
        .list(platform, &owner, query.limit)
        .await?;

    let resp = ApiResponse::success(posts, start)
        .with_link("self", &format!("/api/v1/posts?platform={platform}"));
    Ok(Json(resp))
}

/// POST /api/v1/posts - Save a new post.
pub async fn create_post(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Json(body): Json<CreatePostBody>,
) -> Result<(StatusCode, Json<ApiResponse<SavedPost>>), AppError> {
    let start = Instant::now();

    let post = state
        .post_service
        .save(&body.content, body.platform, &owner)
        .await?;
    tracing::info!(id = %post.id, platform = %post.platform, "Saved post");

    let link = self_link(&post);
    let resp = ApiResponse::success(post, start).with_link("self", &link);
    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SavedPost>>, AppError> {
    let start = Instant::now();
    let id = parse_id(&id)?;

    let post = state.post_service.get(&id, &owner).await?;

    let link = self_link(&post);
    Ok(Json(ApiResponse::success(post, start).with_link("self", &link)))
}

/// PUT /api/v1/posts/{id} - Replace a post's content.
pub async fn update_post(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(body): Json<UpdatePostBody>,
) -> Result<Json<ApiResponse<SavedPost>>, AppError> {
    let start = Instant::now();
    let id = parse_id(&id)?;

    let post = state
        .post_service
        .update(&id, &body.content, &owner)
        .await?;

    let link = self_link(&post);
    Ok(Json(ApiResponse::success(post, start).with_link("self", &link)))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let id = parse_id(&id)?;

    state.post_service.delete(&id, &owner).await?;
    tracing::info!(%id, "Deleted post");

    let data = serde_json::json!({ "deleted": true, "id": id });
    Ok(Json(ApiResponse::success(data, start)))
}
