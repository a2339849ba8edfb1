use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use dsa_core::progress::{is_complete, overall_progress, set_node_completed, set_subtopic};
use dsa_db::{
    models::RoadmapNode,
    repositories::{node, progress, roadmap},
};
use validator::Validate;

use super::{
    model::{ProgressResponse, RoadmapQuery, UpdateProgressRequest},
    service::{build_response, roadmap_unlock},
};
use crate::{ApiState, auth::AuthUser, error::ApiError, metrics, roadmap::routes::find_published};

pub fn routes() -> Router<ApiState> {
    Router::new().route(
        "/roadmaps/progress",
        get(get_progress).post(update_progress).delete(reset_progress),
    )
}

async fn get_progress(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<RoadmapQuery>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let roadmap = find_published(&state.pool, &query.roadmap_id).await?;

    let nodes = node::list_for_roadmap(&state.pool, &roadmap.slug)
        .await
        .map_err(ApiError::Database)?;

    let record = progress::find(&state.pool, auth_user.user_id, &roadmap.slug)
        .await
        .map_err(ApiError::Database)?;

    let unlock = roadmap_unlock(
        &state.pool,
        auth_user.user_id,
        &roadmap,
        record.as_ref().is_some_and(|r| r.unlocked_via_card_test),
    )
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(build_response(&roadmap.slug, &nodes, record.as_ref(), unlock)))
}

async fn update_progress(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<UpdateProgressRequest>,
) -> Result<Json<ProgressResponse>, ApiError> {
    payload.validate()?;

    let mut tx = state.pool.begin().await.map_err(ApiError::Database)?;

    auth_user.record_seen(&mut *tx).await?;

    let roadmap = find_published(&mut *tx, &payload.roadmap_id).await?;

    let nodes = node::list_for_roadmap(&mut *tx, &roadmap.slug)
        .await
        .map_err(ApiError::Database)?;

    let target = nodes
        .iter()
        .find(|n| n.node_id == payload.node_id)
        .ok_or_else(|| ApiError::NotFound(format!("Node '{}' not found", payload.node_id)))?;

    // First touch of a roadmap starts it and makes the user a follower
    if progress::create_if_missing(&mut *tx, auth_user.user_id, &roadmap.slug)
        .await
        .map_err(ApiError::Database)?
    {
        roadmap::increment_followers(&mut *tx, &roadmap.slug)
            .await
            .map_err(ApiError::Database)?;
    }

    let record = progress::find_for_update(&mut *tx, auth_user.user_id, &roadmap.slug)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::Internal("progress record vanished inside transaction".into()))?;

    let mut nodes_progress = record.nodes_progress.0.clone();
    let outline = target.outline();
    let kind = match payload.subtopic_id.as_deref() {
        Some(subtopic_id) => {
            set_subtopic(&mut nodes_progress, &outline, subtopic_id, payload.completed)?;
            "subtopic"
        }
        None => {
            set_node_completed(&mut nodes_progress, &outline, payload.completed)?;
            "node"
        }
    };

    let outlines: Vec<_> = nodes.iter().map(RoadmapNode::outline).collect();
    let overall = overall_progress(&outlines, &nodes_progress);

    let saved = progress::save(&mut *tx, record.id, &nodes_progress, overall)
        .await
        .map_err(ApiError::Database)?;

    let unlock = roadmap_unlock(&mut *tx, auth_user.user_id, &roadmap, saved.unlocked_via_card_test)
        .await
        .map_err(ApiError::Database)?;

    tx.commit().await.map_err(ApiError::Database)?;

    metrics::record_progress_update(kind, is_complete(overall));
    tracing::info!(
        user_id = %auth_user.user_id,
        roadmap = %roadmap.slug,
        node = %payload.node_id,
        overall,
        "progress updated"
    );

    Ok(Json(build_response(&roadmap.slug, &nodes, Some(&saved), unlock)))
}

/// Clear a user's node progress on a roadmap
async fn reset_progress(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<RoadmapQuery>,
) -> Result<StatusCode, ApiError> {
    let reset = progress::reset(&state.pool, auth_user.user_id, &query.roadmap_id)
        .await
        .map_err(ApiError::Database)?;

    if !reset {
        return Err(ApiError::NotFound("No progress recorded for this roadmap".to_string()));
    }

    metrics::record_progress_update("reset", false);
    tracing::info!(user_id = %auth_user.user_id, roadmap = %query.roadmap_id, "progress reset");

    Ok(StatusCode::NO_CONTENT)
}
