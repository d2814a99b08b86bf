//! Article routes and contribution history

use super::{error::ApiError, AppState, LimitQuery};
use crate::auth::{authorize, Action, Principal};
use crate::generation::{self, TOPICS};
use crate::models::{Article, ArticleStatus, ArticleUpdate, Contribution, ContributionAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ArticleQuery {
    pub status: Option<ArticleStatus>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub description: String,
    pub img: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewContribution {
    pub content: String,
}

fn article_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Article {} not found", id))
}

/// GET /api/articles
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ArticleQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let limit = LimitQuery {
        limit: params.limit,
    }
    .resolve();

    let articles = match params.status {
        Some(status) => state.store.list_articles_by_status(status, limit).await?,
        None => state.store.list_articles(limit).await?,
    };
    Ok(Json(articles))
}

/// GET /api/articles/:id
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError> {
    state
        .store
        .find_article(id)
        .await?
        .map(Json)
        .ok_or_else(|| article_not_found(id))
}

/// POST /api/articles
pub async fn create_article(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NewArticle>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    authorize(&principal, Action::CreateArticle)?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".into()));
    }

    let mut article = Article::new(payload.title.trim(), &payload.description, Some(principal.id));
    article.img = payload.img;
    article.tags = payload.tags;

    state.store.insert_article(&article).await?;
    state
        .store
        .insert_contribution(&Contribution::new(
            principal.id,
            article.id,
            ContributionAction::Created,
        ))
        .await?;

    info!("📝 Article {} created by {}", article.id, principal.email);
    Ok((StatusCode::CREATED, Json(article)))
}

/// PUT /api/articles/:id
pub async fn update_article(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(update): Json<ArticleUpdate>,
) -> Result<Json<Article>, ApiError> {
    authorize(&principal, Action::EditArticle)?;

    if update.is_empty() {
        return Err(ApiError::BadRequest("No changes supplied".into()));
    }
    if !state.store.update_article(id, &update).await? {
        return Err(article_not_found(id));
    }

    state
        .store
        .insert_contribution(&Contribution::new(principal.id, id, ContributionAction::Edited))
        .await?;

    let article = state
        .store
        .find_article(id)
        .await?
        .ok_or_else(|| article_not_found(id))?;
    Ok(Json(article))
}

/// DELETE /api/articles/:id
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    authorize(&principal, Action::DeleteArticle)?;

    if !state.store.delete_article(id).await? {
        return Err(article_not_found(id));
    }

    info!("🗑️ Article {} deleted by {}", id, principal.email);
    Ok(Json(json!({ "message": "Article deleted successfully" })))
}

/// POST /api/articles/generate
pub async fn generate_articles(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, ApiError> {
    authorize(&principal, Action::CreateArticle)?;

    let generator = state
        .generator
        .clone()
        .ok_or_else(|| ApiError::Unavailable("Article generation is not configured".into()))?;

    let articles =
        generation::generate_articles(generator.as_ref(), state.store.as_ref(), &TOPICS).await?;

    Ok(Json(json!({
        "message": "Articles generated successfully",
        "count": articles.len(),
        "articles": articles,
    })))
}

/// GET /api/articles/:id/contributions
pub async fn article_contributions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<Contribution>>, ApiError> {
    let contributions = state
        .store
        .contributions_by_article(id, params.resolve())
        .await?;
    Ok(Json(contributions))
}

/// POST /api/articles/:id/contributions
///
/// Any signed-in user may propose an addition. It waits in the admin
/// queue until approved or rejected.
pub async fn submit_contribution(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewContribution>,
) -> Result<(StatusCode, Json<Contribution>), ApiError> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Contribution content is required".into()));
    }

    if state.store.find_article(id).await?.is_none() {
        return Err(article_not_found(id));
    }

    let contribution = Contribution::submitted(principal.id, id, content);
    state.store.insert_contribution(&contribution).await?;

    info!(
        "✍️ Contribution {} submitted to article {} by {}",
        contribution.id, id, principal.email
    );
    Ok((StatusCode::CREATED, Json(contribution)))
}

/// GET /api/users/:id/contributions
pub async fn user_contributions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<Contribution>>, ApiError> {
    let contributions = state
        .store
        .contributions_by_user(id, params.resolve())
        .await?;
    Ok(Json(contributions))
}
