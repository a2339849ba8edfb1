use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::Activity;

/// Quiz attempts and progress updates for a user, merged newest first.
pub async fn recent<'e, E>(executor: E, user_id: Uuid, limit: i64) -> Result<Vec<Activity>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT kind, roadmap_slug, roadmap_title, detail, percentage, passed, occurred_at
            FROM (
                SELECT 'quiz_attempt'::text AS kind,
                       q.roadmap_slug::text AS roadmap_slug,
                       r.title::text AS roadmap_title,
                       q.quiz_id::text AS detail,
                       q.percentage,
                       q.passed,
                       q.completed_at AS occurred_at
                FROM quiz_results q
                JOIN roadmaps r ON r.slug = q.roadmap_slug
                WHERE q.user_id = $1

                UNION ALL

                SELECT 'progress'::text,
                       p.roadmap_slug::text,
                       r.title::text,
                       CASE WHEN p.completed_at IS NOT NULL THEN 'completed' ELSE 'in-progress' END,
                       p.overall_progress,
                       NULL::boolean,
                       p.updated_at
                FROM user_roadmap_progress p
                JOIN roadmaps r ON r.slug = p.roadmap_slug
                WHERE p.user_id = $1
            ) feed
            ORDER BY occurred_at DESC
            LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(executor)
    .await
}
