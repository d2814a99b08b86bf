//! HTTP API
//! Mission: Wire the store, identity pipeline, guards and engagement engine to routes

pub mod activity;
pub mod admin;
pub mod analytics;
pub mod articles;
pub mod badges;
pub mod comments;
pub mod error;

use crate::auth::{
    api as auth_api, identity::IdentityResolver, jwt::JwtHandler, require_principal,
    require_subject,
};
use crate::engagement::{BadgeEngine, EngagementAnalytics};
use crate::generation::ArticleGenerator;
use crate::store::{ContentStore, DEFAULT_LIST_LIMIT};
use axum::{
    handler::Handler,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub jwt: Arc<JwtHandler>,
    pub resolver: IdentityResolver,
    pub badges: BadgeEngine,
    pub analytics: EngagementAnalytics,
    pub generator: Option<Arc<dyn ArticleGenerator>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ContentStore>,
        jwt: Arc<JwtHandler>,
        generator: Option<Arc<dyn ArticleGenerator>>,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(jwt.clone(), store.clone()),
            badges: BadgeEngine::new(store.clone()),
            analytics: EngagementAnalytics::new(store.clone()),
            store,
            jwt,
            generator,
        }
    }
}

/// Optional `?limit=` on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    pub fn resolve(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, DEFAULT_LIST_LIMIT)
    }
}

/// Create the API router
///
/// Paths that serve both public reads and authenticated writes carry the
/// principal layer on the write handlers only, so unsupported methods on
/// them still answer 405.
pub fn router(state: AppState) -> Router {
    let principal_layer =
        middleware::from_fn_with_state(state.resolver.clone(), require_principal);

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(auth_api::signup))
        .route("/api/auth/login", post(auth_api::login))
        .route(
            "/api/users/:id/contributions",
            get(articles::user_contributions),
        )
        .route("/api/badges/user/:id", get(badges::user_badges));

    let shared_routes = Router::new()
        .route(
            "/api/articles",
            get(articles::list_articles)
                .post(articles::create_article.layer(principal_layer.clone())),
        )
        .route(
            "/api/articles/:id",
            get(articles::get_article)
                .put(articles::update_article.layer(principal_layer.clone()))
                .delete(articles::delete_article.layer(principal_layer.clone())),
        )
        .route(
            "/api/articles/:id/comments",
            get(comments::list_comments)
                .post(comments::create_comment.layer(principal_layer.clone())),
        )
        .route(
            "/api/articles/:id/contributions",
            get(articles::article_contributions)
                .post(articles::submit_contribution.layer(principal_layer.clone())),
        );

    let subject_routes = Router::new()
        .route("/api/auth/me", get(auth_api::me))
        .route_layer(middleware::from_fn_with_state(
            state.resolver.clone(),
            require_subject,
        ));

    let protected_routes = Router::new()
        .route("/api/auth/password", put(auth_api::change_password))
        .route("/api/articles/generate", post(articles::generate_articles))
        .route(
            "/api/comments/:id",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/api/comments/:id/flag", post(comments::flag_comment))
        .route("/api/activity", post(activity::log_activity))
        .route("/api/activity/me", get(activity::my_activity))
        .route("/api/activity/recent", get(activity::recent_activity))
        .route("/api/badges/assign", post(badges::assign_badges))
        .route("/api/analytics/top-users", get(analytics::top_users))
        .route("/api/analytics/top-articles", get(analytics::top_articles))
        .route("/api/analytics/most-commented", get(analytics::most_commented))
        .route("/api/analytics/users/:id", get(analytics::user_engagement))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/:id", delete(admin::delete_user))
        .route("/api/admin/users/:id/ban", post(admin::ban_user))
        .route("/api/admin/users/:id/restore", post(admin::restore_user))
        .route("/api/admin/users/:id/role", put(admin::set_role))
        .route("/api/admin/moderation-queue", get(admin::moderation_queue))
        .route(
            "/api/admin/articles/:id/approve",
            post(admin::approve_article),
        )
        .route("/api/admin/flagged-comments", get(admin::flagged_comments))
        .route("/api/admin/contributions", get(admin::pending_contributions))
        .route(
            "/api/admin/contributions/:id/approve",
            post(admin::approve_contribution),
        )
        .route(
            "/api/admin/contributions/:id/reject",
            post(admin::reject_contribution),
        )
        .route_layer(principal_layer);

    Router::new()
        .merge(public_routes)
        .merge(shared_routes)
        .merge(subject_routes)
        .merge(protected_routes)
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
