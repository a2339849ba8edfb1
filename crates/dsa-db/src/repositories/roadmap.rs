use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::models::{Roadmap, RoadmapInput};

const ROADMAP_COLUMNS: &str = r#"
    id, slug, title, description, category, difficulty, estimated_weeks, icon, color,
    prerequisites, outcomes, target_roles, sort_order, notes_attachments, published,
    passing_score, followers, total_nodes, created_at, updated_at
"#;

/// Published roadmaps in display order, optionally filtered.
pub async fn list_published<'e, E>(
    executor: E,
    category: Option<&str>,
    difficulty: Option<&str>,
) -> Result<Vec<Roadmap>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        r#"
            SELECT {ROADMAP_COLUMNS}
            FROM roadmaps
            WHERE published = true
                AND ($1::text IS NULL OR category = $1)
                AND ($2::text IS NULL OR difficulty = $2)
            ORDER BY sort_order, title
        "#
    ))
    .bind(category)
    .bind(difficulty)
    .fetch_all(executor)
    .await
}

/// Every roadmap, published or not (admin view).
pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Roadmap>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        r#"
            SELECT {ROADMAP_COLUMNS}
            FROM roadmaps
            ORDER BY sort_order, title
        "#
    ))
    .fetch_all(executor)
    .await
}

pub async fn find_by_slug<'e, E>(executor: E, slug: &str) -> Result<Option<Roadmap>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        r#"
            SELECT {ROADMAP_COLUMNS}
            FROM roadmaps
            WHERE slug = $1
        "#
    ))
    .bind(slug)
    .fetch_optional(executor)
    .await
}

/// Roadmaps for a list of slugs, in no particular order.
pub async fn find_by_slugs<'e, E>(executor: E, slugs: &[String]) -> Result<Vec<Roadmap>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        r#"
            SELECT {ROADMAP_COLUMNS}
            FROM roadmaps
            WHERE slug = ANY($1)
        "#
    ))
    .bind(slugs)
    .fetch_all(executor)
    .await
}

pub async fn create<'e, E>(executor: E, input: &RoadmapInput) -> Result<Roadmap, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        r#"
            INSERT INTO roadmaps (
                id, slug, title, description, category, difficulty, estimated_weeks, icon, color,
                prerequisites, outcomes, target_roles, sort_order, notes_attachments, published,
                passing_score
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {ROADMAP_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&input.slug)
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.category)
    .bind(&input.difficulty)
    .bind(input.estimated_weeks)
    .bind(&input.icon)
    .bind(&input.color)
    .bind(&input.prerequisites)
    .bind(&input.outcomes)
    .bind(&input.target_roles)
    .bind(input.sort_order)
    .bind(Json(&input.notes_attachments))
    .bind(input.published)
    .bind(input.passing_score)
    .fetch_one(executor)
    .await
}

/// Replace a roadmap's editable fields. The slug may change; references follow via ON UPDATE CASCADE.
pub async fn update<'e, E>(
    executor: E,
    slug: &str,
    input: &RoadmapInput,
) -> Result<Option<Roadmap>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        r#"
            UPDATE roadmaps
            SET slug = $2,
                title = $3,
                description = $4,
                category = $5,
                difficulty = $6,
                estimated_weeks = $7,
                icon = $8,
                color = $9,
                prerequisites = $10,
                outcomes = $11,
                target_roles = $12,
                sort_order = $13,
                notes_attachments = $14,
                published = $15,
                passing_score = $16,
                updated_at = NOW()
            WHERE slug = $1
            RETURNING {ROADMAP_COLUMNS}
        "#
    ))
    .bind(slug)
    .bind(&input.slug)
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.category)
    .bind(&input.difficulty)
    .bind(input.estimated_weeks)
    .bind(&input.icon)
    .bind(&input.color)
    .bind(&input.prerequisites)
    .bind(&input.outcomes)
    .bind(&input.target_roles)
    .bind(input.sort_order)
    .bind(Json(&input.notes_attachments))
    .bind(input.published)
    .bind(input.passing_score)
    .fetch_optional(executor)
    .await
}

/// Delete a roadmap; nodes, progress, quizzes and results cascade.
pub async fn delete<'e, E>(executor: E, slug: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM roadmaps WHERE slug = $1
        "#,
    )
    .bind(slug)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn increment_followers<'e, E>(executor: E, slug: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE roadmaps SET followers = followers + 1 WHERE slug = $1
        "#,
    )
    .bind(slug)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn refresh_total_nodes<'e, E>(executor: E, slug: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE roadmaps
            SET total_nodes = (SELECT COUNT(*)::int FROM roadmap_nodes WHERE roadmap_slug = $1)
            WHERE slug = $1
        "#,
    )
    .bind(slug)
    .execute(executor)
    .await?;
    Ok(())
}

/// Recompute followers and node counts for every roadmap from source rows.
///
/// Returns the number of roadmaps whose stats changed.
pub async fn refresh_all_stats<'e, E>(executor: E) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            WITH computed AS (
                SELECT
                    r.slug,
                    (SELECT COUNT(*)::int FROM roadmap_nodes n WHERE n.roadmap_slug = r.slug) AS total_nodes,
                    (SELECT COUNT(*)::int FROM user_roadmap_progress p WHERE p.roadmap_slug = r.slug) AS followers
                FROM roadmaps r
            )
            UPDATE roadmaps r
            SET total_nodes = c.total_nodes,
                followers = c.followers
            FROM computed c
            WHERE r.slug = c.slug
                AND (r.total_nodes <> c.total_nodes OR r.followers <> c.followers)
        "#,
    )
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
