use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use dsa_db::{models::Activity, repositories::activity};
use serde::Deserialize;

use crate::{ApiState, auth::AuthUser, error::ApiError};

const DEFAULT_ACTIVITY_LIMIT: i64 = 20;
const MAX_ACTIVITY_LIMIT: i64 = 100;

pub fn routes() -> Router<ApiState> {
    Router::new().route("/profile/activities", get(list_activities))
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, MAX_ACTIVITY_LIMIT)
}

/// Recent quiz attempts and progress updates, newest first
async fn list_activities(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    let activities = activity::recent(&state.pool, auth_user.user_id, clamp_limit(query.limit))
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(activities))
}
