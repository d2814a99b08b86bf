//! Badge routes

use super::{error::ApiError, AppState};
use crate::auth::Principal;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

/// POST /api/badges/assign
pub async fn assign_badges(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, ApiError> {
    let badges = state.badges.assign_badges(principal.id).await?;
    Ok(Json(json!({
        "message": "Badges updated successfully",
        "badges": badges,
    })))
}

/// GET /api/badges/user/:id
pub async fn user_badges(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let badges = state.badges.user_badges(user_id).await?;
    Ok(Json(json!({
        "user_id": user_id,
        "badges": badges,
    })))
}
