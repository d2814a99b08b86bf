//! Engagement analytics routes (user managers only)

use super::{error::ApiError, AppState, LimitQuery};
use crate::auth::{authorize, Action, Principal};
use crate::engagement::UserEngagement;
use crate::models::{ArticleCommentCount, ArticleViewCount, UserActivityCount};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

/// GET /api/analytics/top-users
pub async fn top_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<UserActivityCount>>, ApiError> {
    authorize(&principal, Action::ViewAnalytics)?;
    Ok(Json(state.analytics.top_users(params.limit).await?))
}

/// GET /api/analytics/top-articles
pub async fn top_articles(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<ArticleViewCount>>, ApiError> {
    authorize(&principal, Action::ViewAnalytics)?;
    Ok(Json(state.analytics.top_articles(params.limit).await?))
}

/// GET /api/analytics/most-commented
pub async fn most_commented(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<ArticleCommentCount>>, ApiError> {
    authorize(&principal, Action::ViewAnalytics)?;
    Ok(Json(state.analytics.most_commented(params.limit).await?))
}

/// GET /api/analytics/users/:id
pub async fn user_engagement(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserEngagement>, ApiError> {
    authorize(&principal, Action::ViewAnalytics)?;
    Ok(Json(state.analytics.user_engagement(user_id).await?))
}
