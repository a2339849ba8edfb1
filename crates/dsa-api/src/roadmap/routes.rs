use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use dsa_db::{
    models::{Roadmap, RoadmapNode},
    repositories::{node, roadmap},
};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Postgres};

use crate::{ApiState, error::ApiError};

/// Create the public roadmap routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/roadmaps", get(list_roadmaps))
        .route("/roadmaps/{slug}", get(get_roadmap))
}

#[derive(Debug, Deserialize)]
pub struct RoadmapFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

/// A roadmap together with its nodes, ordered by week
#[derive(Debug, Serialize)]
pub struct RoadmapDetail {
    #[serde(flatten)]
    pub roadmap: Roadmap,
    pub nodes: Vec<RoadmapNode>,
}

/// Load a roadmap learners may see; unpublished roadmaps read as missing.
pub async fn find_published<'e, E>(executor: E, slug: &str) -> Result<Roadmap, ApiError>
where
    E: Executor<'e, Database = Postgres>,
{
    roadmap::find_by_slug(executor, slug)
        .await
        .map_err(ApiError::Database)?
        .filter(|r| r.published)
        .ok_or_else(|| ApiError::NotFound(format!("Roadmap '{slug}' not found")))
}

async fn list_roadmaps(
    State(state): State<ApiState>,
    Query(filter): Query<RoadmapFilter>,
) -> Result<Json<Vec<Roadmap>>, ApiError> {
    let roadmaps = roadmap::list_published(
        &state.pool,
        filter.category.as_deref().filter(|c| !c.is_empty()),
        filter.difficulty.as_deref().filter(|d| !d.is_empty()),
    )
    .await
    .map_err(ApiError::Database)?;

    Ok(Json(roadmaps))
}

async fn get_roadmap(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> Result<Json<RoadmapDetail>, ApiError> {
    let roadmap = find_published(&state.pool, &slug).await?;

    let nodes = node::list_for_roadmap(&state.pool, &roadmap.slug)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(RoadmapDetail { roadmap, nodes }))
}
