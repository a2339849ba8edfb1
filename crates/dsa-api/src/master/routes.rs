use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use dsa_db::{
    models::{MasterRoadmap, Roadmap},
    repositories::{master, roadmap},
};
use serde::Serialize;

use crate::{ApiState, error::ApiError};

pub fn routes() -> Router<ApiState> {
    Router::new().route("/master-roadmaps/{master_id}", get(get_master_roadmap))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterYearView {
    pub year: i32,
    pub title: String,
    pub roadmaps: Vec<Roadmap>,
}

/// Master roadmap with each year's roadmap slugs resolved
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterRoadmapView {
    pub master_id: String,
    pub title: String,
    pub description: String,
    pub years: Vec<MasterYearView>,
    pub updated_at: DateTime<Utc>,
}

/// Resolve slugs in display order. Unknown and unpublished roadmaps are dropped.
pub fn resolve_years(master: MasterRoadmap, roadmaps: Vec<Roadmap>) -> MasterRoadmapView {
    let by_slug: HashMap<String, Roadmap> = roadmaps
        .into_iter()
        .filter(|r| r.published)
        .map(|r| (r.slug.clone(), r))
        .collect();

    let years = master
        .years
        .0
        .into_iter()
        .map(|year| MasterYearView {
            year: year.year,
            title: year.title,
            roadmaps: year
                .roadmaps
                .iter()
                .filter_map(|slug| by_slug.get(slug).cloned())
                .collect(),
        })
        .collect();

    MasterRoadmapView {
        master_id: master.master_id,
        title: master.title,
        description: master.description,
        years,
        updated_at: master.updated_at,
    }
}

async fn get_master_roadmap(
    State(state): State<ApiState>,
    Path(master_id): Path<String>,
) -> Result<Json<MasterRoadmapView>, ApiError> {
    let master = master::find(&state.pool, &master_id)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound(format!("Master roadmap '{master_id}' not found")))?;

    let slugs: Vec<String> = master
        .years
        .iter()
        .flat_map(|y| y.roadmaps.iter().cloned())
        .collect();

    let roadmaps = roadmap::find_by_slugs(&state.pool, &slugs)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(resolve_years(master, roadmaps)))
}
