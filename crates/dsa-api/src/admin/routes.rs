use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use dsa_db::{
    models::{MasterRoadmap, QuizBankEntry, Roadmap, RoadmapNode},
    repositories::{master, node, quiz, roadmap, stats},
};
use sqlx::{Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use super::model::{
    DashboardStats, MasterRoadmapPayload, NodePayload, QuizBankPayload, QuizBankQuery,
    RoadmapPayload,
};
use crate::{
    ApiState, auth::AdminUser, error::ApiError, progress::service::recompute_roadmap,
    roadmap::routes::RoadmapDetail,
};

/// Create the admin routes; every handler requires the admin role
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/admin/stats", get(dashboard_stats))
        .route("/admin/roadmaps", get(list_roadmaps).post(create_roadmap))
        .route(
            "/admin/roadmaps/{slug}",
            get(get_roadmap).put(update_roadmap).delete(delete_roadmap),
        )
        .route(
            "/admin/roadmaps/{slug}/nodes",
            get(list_nodes).post(create_node),
        )
        .route(
            "/admin/roadmaps/{slug}/nodes/{node_id}",
            put(update_node).delete(delete_node),
        )
        .route("/admin/quiz-bank", get(list_quiz_bank).post(create_quiz_bank))
        .route(
            "/admin/quiz-bank/{id}",
            put(update_quiz_bank).delete(delete_quiz_bank),
        )
        .route(
            "/admin/master-roadmaps/{master_id}",
            put(upsert_master_roadmap),
        )
}

async fn find_any_roadmap<'e, E>(executor: E, slug: &str) -> Result<Roadmap, ApiError>
where
    E: Executor<'e, Database = Postgres>,
{
    roadmap::find_by_slug(executor, slug)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound(format!("Roadmap '{slug}' not found")))
}

fn reject_self_reference(id: &str, prerequisites: &[String]) -> Result<(), ApiError> {
    if prerequisites.iter().any(|p| p == id) {
        return Err(ApiError::Validation(format!(
            "'{id}' cannot list itself as a prerequisite"
        )));
    }
    Ok(())
}

async fn dashboard_stats(
    AdminUser(_admin): AdminUser,
    State(state): State<ApiState>,
) -> Result<Json<DashboardStats>, ApiError> {
    let counts = stats::dashboard_counts(&state.pool)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(counts.into()))
}

async fn list_roadmaps(
    AdminUser(_admin): AdminUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Roadmap>>, ApiError> {
    let roadmaps = roadmap::list_all(&state.pool)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(roadmaps))
}

async fn get_roadmap(
    AdminUser(_admin): AdminUser,
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> Result<Json<RoadmapDetail>, ApiError> {
    let roadmap = find_any_roadmap(&state.pool, &slug).await?;
    let nodes = node::list_for_roadmap(&state.pool, &roadmap.slug)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(RoadmapDetail { roadmap, nodes }))
}

async fn create_roadmap(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Json(payload): Json<RoadmapPayload>,
) -> Result<(StatusCode, Json<Roadmap>), ApiError> {
    payload.validate()?;
    reject_self_reference(&payload.slug, &payload.prerequisites)?;

    let created = roadmap::create(&state.pool, &payload.into_input())
        .await
        .map_err(|e| ApiError::from_write(e, "A roadmap with this slug already exists"))?;

    tracing::info!(admin_id = %admin.user_id, slug = %created.slug, "Roadmap created");

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_roadmap(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Json(payload): Json<RoadmapPayload>,
) -> Result<Json<Roadmap>, ApiError> {
    payload.validate()?;
    reject_self_reference(&payload.slug, &payload.prerequisites)?;

    let updated = roadmap::update(&state.pool, &slug, &payload.into_input())
        .await
        .map_err(|e| ApiError::from_write(e, "A roadmap with this slug already exists"))?
        .ok_or_else(|| ApiError::NotFound(format!("Roadmap '{slug}' not found")))?;

    tracing::info!(
        admin_id = %admin.user_id,
        slug = %slug,
        new_slug = %updated.slug,
        "Roadmap updated"
    );

    Ok(Json(updated))
}

async fn delete_roadmap(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = roadmap::delete(&state.pool, &slug)
        .await
        .map_err(ApiError::Database)?;

    if !deleted {
        return Err(ApiError::NotFound(format!("Roadmap '{slug}' not found")));
    }

    tracing::info!(admin_id = %admin.user_id, slug = %slug, "Roadmap deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn list_nodes(
    AdminUser(_admin): AdminUser,
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<RoadmapNode>>, ApiError> {
    let roadmap = find_any_roadmap(&state.pool, &slug).await?;
    let nodes = node::list_for_roadmap(&state.pool, &roadmap.slug)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(nodes))
}

async fn create_node(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Json(payload): Json<NodePayload>,
) -> Result<(StatusCode, Json<RoadmapNode>), ApiError> {
    payload.validate()?;
    reject_self_reference(&payload.node_id, &payload.prerequisites)?;

    let mut tx = state.pool.begin().await.map_err(ApiError::Database)?;

    let roadmap = find_any_roadmap(&mut *tx, &slug).await?;
    let created = node::create(&mut *tx, &roadmap.slug, &payload.into_input())
        .await
        .map_err(|e| ApiError::from_write(e, "A node with this id already exists"))?;
    roadmap::refresh_total_nodes(&mut *tx, &roadmap.slug)
        .await
        .map_err(ApiError::Database)?;
    let recomputed = recompute_roadmap(&mut *tx, &roadmap.slug, None)
        .await
        .map_err(ApiError::Database)?;

    tx.commit().await.map_err(ApiError::Database)?;

    tracing::info!(
        admin_id = %admin.user_id,
        roadmap = %roadmap.slug,
        node_id = %created.node_id,
        recomputed,
        "Roadmap node created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_node(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Path((slug, node_id)): Path<(String, String)>,
    Json(payload): Json<NodePayload>,
) -> Result<Json<RoadmapNode>, ApiError> {
    payload.validate()?;
    reject_self_reference(&payload.node_id, &payload.prerequisites)?;

    let mut tx = state.pool.begin().await.map_err(ApiError::Database)?;

    let updated = node::update(&mut *tx, &slug, &node_id, &payload.into_input())
        .await
        .map_err(|e| ApiError::from_write(e, "A node with this id already exists"))?
        .ok_or_else(|| ApiError::NotFound(format!("Node '{node_id}' not found")))?;

    let renamed =
        (updated.node_id != node_id).then_some((node_id.as_str(), updated.node_id.as_str()));
    if let Some((old_id, new_id)) = renamed {
        node::rename_prerequisite(&mut *tx, &slug, old_id, new_id)
            .await
            .map_err(ApiError::Database)?;
    }
    let recomputed = recompute_roadmap(&mut *tx, &slug, renamed)
        .await
        .map_err(ApiError::Database)?;

    tx.commit().await.map_err(ApiError::Database)?;

    tracing::info!(
        admin_id = %admin.user_id,
        roadmap = %slug,
        node_id = %node_id,
        new_node_id = %updated.node_id,
        recomputed,
        "Roadmap node updated"
    );

    Ok(Json(updated))
}

async fn delete_node(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Path((slug, node_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let mut tx = state.pool.begin().await.map_err(ApiError::Database)?;

    let deleted = node::delete(&mut *tx, &slug, &node_id)
        .await
        .map_err(ApiError::Database)?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Node '{node_id}' not found")));
    }
    node::remove_prerequisite(&mut *tx, &slug, &node_id)
        .await
        .map_err(ApiError::Database)?;
    roadmap::refresh_total_nodes(&mut *tx, &slug)
        .await
        .map_err(ApiError::Database)?;
    let recomputed = recompute_roadmap(&mut *tx, &slug, None)
        .await
        .map_err(ApiError::Database)?;

    tx.commit().await.map_err(ApiError::Database)?;

    tracing::info!(
        admin_id = %admin.user_id,
        roadmap = %slug,
        node_id = %node_id,
        recomputed,
        "Roadmap node deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

async fn list_quiz_bank(
    AdminUser(_admin): AdminUser,
    State(state): State<ApiState>,
    Query(query): Query<QuizBankQuery>,
) -> Result<Json<Vec<QuizBankEntry>>, ApiError> {
    let roadmap = find_any_roadmap(&state.pool, &query.roadmap_id).await?;
    let entries = quiz::list_bank(&state.pool, &roadmap.slug)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(entries))
}

async fn create_quiz_bank(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Json(payload): Json<QuizBankPayload>,
) -> Result<(StatusCode, Json<QuizBankEntry>), ApiError> {
    payload.validate()?;
    find_any_roadmap(&state.pool, &payload.roadmap_id).await?;

    let created = quiz::create_bank(&state.pool, &payload.into_input())
        .await
        .map_err(|e| ApiError::from_write(e, "This roadmap already has a quiz with this id"))?;

    tracing::info!(
        admin_id = %admin.user_id,
        roadmap = %created.roadmap_slug,
        quiz_id = %created.quiz_id,
        questions = created.questions.len(),
        "Quiz bank entry created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_quiz_bank(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuizBankPayload>,
) -> Result<Json<QuizBankEntry>, ApiError> {
    payload.validate()?;

    let updated = quiz::update_bank(&state.pool, id, &payload.into_input())
        .await
        .map_err(|e| ApiError::from_write(e, "This roadmap already has a quiz with this id"))?
        .ok_or_else(|| ApiError::NotFound("Quiz bank entry not found".to_string()))?;

    tracing::info!(admin_id = %admin.user_id, quiz_bank_id = %id, "Quiz bank entry updated");

    Ok(Json(updated))
}

async fn delete_quiz_bank(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = quiz::delete_bank(&state.pool, id)
        .await
        .map_err(ApiError::Database)?;

    if !deleted {
        return Err(ApiError::NotFound("Quiz bank entry not found".to_string()));
    }

    tracing::info!(admin_id = %admin.user_id, quiz_bank_id = %id, "Quiz bank entry deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn upsert_master_roadmap(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Path(master_id): Path<String>,
    Json(payload): Json<MasterRoadmapPayload>,
) -> Result<Json<MasterRoadmap>, ApiError> {
    payload.validate()?;

    let saved = master::upsert(
        &state.pool,
        &master_id,
        &payload.title,
        &payload.description,
        &payload.years,
    )
    .await
    .map_err(ApiError::Database)?;

    tracing::info!(admin_id = %admin.user_id, master_id = %master_id, "Master roadmap saved");

    Ok(Json(saved))
}
