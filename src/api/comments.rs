//! Comment routes

use super::{error::ApiError, AppState, LimitQuery};
use crate::auth::{authorize, Action, Principal};
use crate::models::{ActivityAction, ActivityRecord, Comment, CommentStatus};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub content: String,
}

impl CommentBody {
    fn content(&self) -> Result<&str, ApiError> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ApiError::BadRequest("Comment content is required".into()));
        }
        Ok(content)
    }
}

async fn load_comment(state: &AppState, id: Uuid) -> Result<Comment, ApiError> {
    state
        .store
        .find_comment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Comment {} not found", id)))
}

/// GET /api/articles/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = state
        .store
        .list_comments_for_article(article_id, params.resolve())
        .await?;
    Ok(Json(comments))
}

/// POST /api/articles/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(article_id): Path<Uuid>,
    Json(body): Json<CommentBody>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let content = body.content()?;

    if state.store.find_article(article_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Article {} not found",
            article_id
        )));
    }

    let comment = Comment::new(article_id, principal.id, content);
    state.store.insert_comment(&comment).await?;

    let mut metadata = Map::new();
    metadata.insert("article_id".into(), json!(article_id));
    metadata.insert("comment_id".into(), json!(comment.id));
    state
        .store
        .insert_activity(&ActivityRecord::new(
            principal.id,
            ActivityAction::Commented,
            metadata,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/comments/:id
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(body): Json<CommentBody>,
) -> Result<Json<Comment>, ApiError> {
    let comment = load_comment(&state, id).await?;
    authorize(
        &principal,
        Action::EditComment {
            author_id: comment.user_id,
        },
    )?;

    state
        .store
        .update_comment_content(id, body.content()?)
        .await?;
    Ok(Json(load_comment(&state, id).await?))
}

/// DELETE /api/comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let comment = load_comment(&state, id).await?;
    authorize(
        &principal,
        Action::DeleteComment {
            author_id: comment.user_id,
        },
    )?;

    state.store.delete_comment(id).await?;
    info!("🗑️ Comment {} deleted by {}", id, principal.email);
    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}

/// POST /api/comments/:id/flag
pub async fn flag_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    load_comment(&state, id).await?;
    state
        .store
        .set_comment_status(id, CommentStatus::Flagged)
        .await?;

    info!("🚩 Comment {} flagged by {}", id, principal.email);
    Ok(Json(json!({ "message": "Comment flagged for review" })))
}
