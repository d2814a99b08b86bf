//! Admin routes: user management and moderation

use super::{error::ApiError, AppState};
use crate::auth::{
    authorize,
    models::{AccountStatus, UserResponse},
    Action, Principal, Role,
};
use crate::models::{
    Article, ArticleStatus, Comment, CommentStatus, Contribution, ContributionStatus,
};
use crate::store::DEFAULT_LIST_LIMIT;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: String,
}

fn user_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("User {} not found", id))
}

fn not_self(principal: &Principal, target: Uuid, what: &str) -> Result<(), ApiError> {
    if principal.id == target {
        return Err(ApiError::BadRequest(format!("Cannot {} your own account", what)));
    }
    Ok(())
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    authorize(&principal, Action::ManageUsers)?;

    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(UserResponse::from_user).collect()))
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    authorize(&principal, Action::ManageUsers)?;
    not_self(&principal, id, "delete")?;

    if !state.store.delete_user(id).await? {
        return Err(user_not_found(id));
    }

    info!("🗑️ User {} deleted by {}", id, principal.email);
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

async fn set_status(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    status: AccountStatus,
) -> Result<(), ApiError> {
    if !state.store.set_user_status(id, status).await? {
        return Err(user_not_found(id));
    }
    info!("👤 User {} set to {} by {}", id, status, principal.email);
    Ok(())
}

/// POST /api/admin/users/:id/ban
pub async fn ban_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    authorize(&principal, Action::ManageUsers)?;
    not_self(&principal, id, "ban")?;
    set_status(&state, &principal, id, AccountStatus::Banned).await?;
    Ok(Json(json!({ "message": "User banned successfully" })))
}

/// POST /api/admin/users/:id/restore
pub async fn restore_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    authorize(&principal, Action::ManageUsers)?;
    set_status(&state, &principal, id, AccountStatus::Active).await?;
    Ok(Json(json!({ "message": "User restored successfully" })))
}

/// PUT /api/admin/users/:id/role
pub async fn set_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(body): Json<RoleChange>,
) -> Result<Json<Value>, ApiError> {
    authorize(&principal, Action::ManageUsers)?;
    not_self(&principal, id, "change the role of")?;

    // unknown names would parse to reader
    let role = Role::parse(&body.role);
    if !role.as_str().eq_ignore_ascii_case(body.role.trim()) {
        return Err(ApiError::BadRequest(format!("Unknown role '{}'", body.role)));
    }

    if !state.store.set_user_role(id, role).await? {
        return Err(user_not_found(id));
    }

    info!("👤 User {} is now {} (by {})", id, role, principal.email);
    Ok(Json(json!({ "message": "Role updated", "role": role })))
}

/// GET /api/admin/moderation-queue
pub async fn moderation_queue(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Article>>, ApiError> {
    authorize(&principal, Action::ManageUsers)?;

    let pending = state
        .store
        .list_articles_by_status(ArticleStatus::Pending, DEFAULT_LIST_LIMIT)
        .await?;
    Ok(Json(pending))
}

/// POST /api/admin/articles/:id/approve
pub async fn approve_article(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    authorize(&principal, Action::ManageUsers)?;

    if !state
        .store
        .set_article_status(id, ArticleStatus::Approved)
        .await?
    {
        return Err(ApiError::NotFound(format!("Article {} not found", id)));
    }

    info!("✅ Article {} approved by {}", id, principal.email);
    Ok(Json(json!({ "message": "Article approved successfully" })))
}

/// GET /api/admin/flagged-comments
pub async fn flagged_comments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    authorize(&principal, Action::ManageUsers)?;

    let flagged = state
        .store
        .list_comments_by_status(CommentStatus::Flagged, DEFAULT_LIST_LIMIT)
        .await?;
    Ok(Json(flagged))
}

/// GET /api/admin/contributions
pub async fn pending_contributions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Contribution>>, ApiError> {
    authorize(&principal, Action::ManageUsers)?;

    let pending = state
        .store
        .list_contributions_by_status(ContributionStatus::Pending, DEFAULT_LIST_LIMIT)
        .await?;
    Ok(Json(pending))
}

async fn review_contribution(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    status: ContributionStatus,
) -> Result<(), ApiError> {
    authorize(principal, Action::ManageUsers)?;

    if state.store.find_contribution(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Contribution {} not found", id)));
    }
    if !state.store.review_contribution(id, status).await? {
        return Err(ApiError::Conflict(format!(
            "Contribution {} is not awaiting review",
            id
        )));
    }

    info!("📝 Contribution {} {} by {}", id, status.as_str(), principal.email);
    Ok(())
}

/// POST /api/admin/contributions/:id/approve
pub async fn approve_contribution(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    review_contribution(&state, &principal, id, ContributionStatus::Approved).await?;
    Ok(Json(json!({ "message": "Contribution approved", "status": "approved" })))
}

/// POST /api/admin/contributions/:id/reject
pub async fn reject_contribution(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    review_contribution(&state, &principal, id, ContributionStatus::Rejected).await?;
    Ok(Json(json!({ "message": "Contribution rejected", "status": "rejected" })))
}
