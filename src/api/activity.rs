//! Activity log routes

use super::{error::ApiError, AppState, LimitQuery};
use crate::auth::{authorize, Action, Principal};
use crate::models::{ActivityAction, ActivityRecord};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct LogActivity {
    pub action: ActivityAction,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// POST /api/activity
///
/// Records the action for the caller and recomputes their badges.
pub async fn log_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<LogActivity>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let record = ActivityRecord::new(principal.id, body.action, body.metadata);
    state.store.insert_activity(&record).await?;
    debug!("Activity {} logged for {}", record.action, principal.email);

    let badges = state.badges.assign_badges(principal.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Activity logged: {}", record.action),
            "activity_id": record.id,
            "badges": badges,
        })),
    ))
}

/// GET /api/activity/me
pub async fn my_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<ActivityRecord>>, ApiError> {
    let records = state
        .store
        .activity_for_user(principal.id, params.resolve())
        .await?;
    Ok(Json(records))
}

/// GET /api/activity/recent
pub async fn recent_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<ActivityRecord>>, ApiError> {
    authorize(&principal, Action::ViewAnalytics)?;

    let limit = LimitQuery {
        limit: params.limit.or(Some(DEFAULT_RECENT_LIMIT)),
    }
    .resolve();
    Ok(Json(state.store.recent_activity(limit).await?))
}
