use std::collections::HashMap;

use dsa_core::{
    progress::{is_complete, node_views, orphaned_nodes, overall_progress, reconcile, rename_node},
    unlock::{card_progress, is_roadmap_unlocked},
};
use dsa_db::{
    models::{Roadmap, RoadmapNode, UserRoadmapProgress},
    repositories::{node, progress},
};
use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;

use super::model::{PrerequisiteProgress, ProgressResponse, RoadmapUnlock};

/// Overall progress on each of `slugs`, in the same order. Untouched roadmaps count as 0.
pub async fn progress_for_slugs<'e, E>(
    executor: E,
    user_id: Uuid,
    slugs: &[String],
) -> Result<Vec<i32>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    if slugs.is_empty() {
        return Ok(Vec::new());
    }
    let known: HashMap<String, i32> = progress::overall_for_slugs(executor, user_id, slugs)
        .await?
        .into_iter()
        .collect();
    Ok(slugs.iter().map(|s| known.get(s).copied().unwrap_or(0)).collect())
}

/// Evaluate whether `roadmap` is open for a user.
pub async fn roadmap_unlock<'e, E>(
    executor: E,
    user_id: Uuid,
    roadmap: &Roadmap,
    unlocked_via_card_test: bool,
) -> Result<RoadmapUnlock, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let percentages = progress_for_slugs(executor, user_id, &roadmap.prerequisites).await?;
    Ok(unlock_from_percentages(&roadmap.prerequisites, &percentages, unlocked_via_card_test))
}

pub fn unlock_from_percentages(
    prerequisites: &[String],
    percentages: &[i32],
    unlocked_via_card_test: bool,
) -> RoadmapUnlock {
    RoadmapUnlock {
        unlocked: is_roadmap_unlocked(percentages, unlocked_via_card_test),
        unlocked_via_card_test,
        card_progress: card_progress(percentages),
        prerequisites: prerequisites
            .iter()
            .zip(percentages)
            .map(|(slug, p)| PrerequisiteProgress {
                roadmap_id: slug.clone(),
                progress: *p,
                completed: is_complete(*p),
            })
            .collect(),
    }
}

/// Re-derive every user's progress on a roadmap after its nodes changed.
///
/// `renamed` carries a node id change so the work recorded under the old id
/// follows the node. Must run in the transaction that changed the nodes.
/// Returns the number of records rewritten.
pub async fn recompute_roadmap(
    conn: &mut PgConnection,
    roadmap_slug: &str,
    renamed: Option<(&str, &str)>,
) -> Result<usize, sqlx::Error> {
    let outlines: Vec<_> = node::list_for_roadmap(&mut *conn, roadmap_slug)
        .await?
        .iter()
        .map(RoadmapNode::outline)
        .collect();
    let records = progress::list_for_roadmap_for_update(&mut *conn, roadmap_slug).await?;

    let mut rewritten = 0;
    for record in records {
        let mut nodes_progress = record.nodes_progress.0;
        let mut changed =
            renamed.is_some_and(|(old, new)| rename_node(&mut nodes_progress, old, new));

        let orphaned = orphaned_nodes(&outlines, &nodes_progress);
        if !orphaned.is_empty() {
            tracing::debug!(
                progress_id = %record.id,
                slug = %roadmap_slug,
                nodes = ?orphaned,
                "Dropping progress for removed nodes"
            );
        }
        changed |= reconcile(&outlines, &mut nodes_progress);

        let overall = overall_progress(&outlines, &nodes_progress);
        let completion_moved = is_complete(overall) != record.completed_at.is_some();
        if changed || completion_moved || overall != record.overall_progress {
            progress::save(&mut *conn, record.id, &nodes_progress, overall).await?;
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

pub fn build_response(
    roadmap_slug: &str,
    nodes: &[RoadmapNode],
    record: Option<&UserRoadmapProgress>,
    unlock: RoadmapUnlock,
) -> ProgressResponse {
    let outlines: Vec<_> = nodes.iter().map(RoadmapNode::outline).collect();
    let node_progress = record.map(|r| r.nodes_progress.0.as_slice()).unwrap_or_default();
    let overall = record.map_or(0, |_| overall_progress(&outlines, node_progress));

    ProgressResponse {
        roadmap_id: roadmap_slug.to_string(),
        started: record.is_some(),
        overall_progress: overall,
        is_completed: is_complete(overall),
        started_at: record.map(|r| r.started_at),
        completed_at: record.and_then(|r| r.completed_at).filter(|_| is_complete(overall)),
        updated_at: record.map(|r| r.updated_at),
        nodes: node_views(&outlines, node_progress),
        unlock,
    }
}
