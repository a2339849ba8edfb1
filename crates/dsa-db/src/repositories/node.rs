use sqlx::{Executor, Postgres, types::Json};

use crate::models::{NodeInput, RoadmapNode};

/// Nodes of a roadmap ordered by week.
pub async fn list_for_roadmap<'e, E>(
    executor: E,
    roadmap_slug: &str,
) -> Result<Vec<RoadmapNode>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT roadmap_slug, node_id, week_number, title, description, subtopics,
                   prerequisites, estimated_hours, created_at, updated_at
            FROM roadmap_nodes
            WHERE roadmap_slug = $1
            ORDER BY week_number, node_id
        "#,
    )
    .bind(roadmap_slug)
    .fetch_all(executor)
    .await
}

pub async fn find<'e, E>(
    executor: E,
    roadmap_slug: &str,
    node_id: &str,
) -> Result<Option<RoadmapNode>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT roadmap_slug, node_id, week_number, title, description, subtopics,
                   prerequisites, estimated_hours, created_at, updated_at
            FROM roadmap_nodes
            WHERE roadmap_slug = $1 AND node_id = $2
        "#,
    )
    .bind(roadmap_slug)
    .bind(node_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(
    executor: E,
    roadmap_slug: &str,
    input: &NodeInput,
) -> Result<RoadmapNode, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO roadmap_nodes (
                roadmap_slug, node_id, week_number, title, description, subtopics,
                prerequisites, estimated_hours
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING roadmap_slug, node_id, week_number, title, description, subtopics,
                      prerequisites, estimated_hours, created_at, updated_at
        "#,
    )
    .bind(roadmap_slug)
    .bind(&input.node_id)
    .bind(input.week_number)
    .bind(&input.title)
    .bind(&input.description)
    .bind(Json(&input.subtopics))
    .bind(&input.prerequisites)
    .bind(input.estimated_hours)
    .fetch_one(executor)
    .await
}

/// Replace a node. The node id may be renamed through `input.node_id`.
pub async fn update<'e, E>(
    executor: E,
    roadmap_slug: &str,
    node_id: &str,
    input: &NodeInput,
) -> Result<Option<RoadmapNode>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE roadmap_nodes
            SET node_id = $3,
                week_number = $4,
                title = $5,
                description = $6,
                subtopics = $7,
                prerequisites = $8,
                estimated_hours = $9,
                updated_at = NOW()
            WHERE roadmap_slug = $1 AND node_id = $2
            RETURNING roadmap_slug, node_id, week_number, title, description, subtopics,
                      prerequisites, estimated_hours, created_at, updated_at
        "#,
    )
    .bind(roadmap_slug)
    .bind(node_id)
    .bind(&input.node_id)
    .bind(input.week_number)
    .bind(&input.title)
    .bind(&input.description)
    .bind(Json(&input.subtopics))
    .bind(&input.prerequisites)
    .bind(input.estimated_hours)
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E>(executor: E, roadmap_slug: &str, node_id: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM roadmap_nodes
            WHERE roadmap_slug = $1 AND node_id = $2
        "#,
    )
    .bind(roadmap_slug)
    .bind(node_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Point other nodes' prerequisites at a node's new id.
pub async fn rename_prerequisite<'e, E>(
    executor: E,
    roadmap_slug: &str,
    old_id: &str,
    new_id: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE roadmap_nodes
            SET prerequisites = array_replace(prerequisites, $2, $3),
                updated_at = NOW()
            WHERE roadmap_slug = $1 AND $2 = ANY(prerequisites)
        "#,
    )
    .bind(roadmap_slug)
    .bind(old_id)
    .bind(new_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Drop a deleted node from other nodes' prerequisites.
pub async fn remove_prerequisite<'e, E>(
    executor: E,
    roadmap_slug: &str,
    node_id: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE roadmap_nodes
            SET prerequisites = array_remove(prerequisites, $2),
                updated_at = NOW()
            WHERE roadmap_slug = $1 AND $2 = ANY(prerequisites)
        "#,
    )
    .bind(roadmap_slug)
    .bind(node_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
