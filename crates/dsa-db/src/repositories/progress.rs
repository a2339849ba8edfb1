use dsa_core::NodeProgress;
use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::models::UserRoadmapProgress;

pub async fn find<'e, E>(
    executor: E,
    user_id: Uuid,
    roadmap_slug: &str,
) -> Result<Option<UserRoadmapProgress>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, roadmap_slug, nodes_progress, overall_progress,
                   unlocked_via_card_test, started_at, completed_at, updated_at
            FROM user_roadmap_progress
            WHERE user_id = $1 AND roadmap_slug = $2
        "#,
    )
    .bind(user_id)
    .bind(roadmap_slug)
    .fetch_optional(executor)
    .await
}

/// Same as [`find`] but locks the row until the surrounding transaction ends.
pub async fn find_for_update<'e, E>(
    executor: E,
    user_id: Uuid,
    roadmap_slug: &str,
) -> Result<Option<UserRoadmapProgress>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, roadmap_slug, nodes_progress, overall_progress,
                   unlocked_via_card_test, started_at, completed_at, updated_at
            FROM user_roadmap_progress
            WHERE user_id = $1 AND roadmap_slug = $2
            FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(roadmap_slug)
    .fetch_optional(executor)
    .await
}

/// Every progress record on a roadmap, locked until the surrounding transaction ends.
pub async fn list_for_roadmap_for_update<'e, E>(
    executor: E,
    roadmap_slug: &str,
) -> Result<Vec<UserRoadmapProgress>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, roadmap_slug, nodes_progress, overall_progress,
                   unlocked_via_card_test, started_at, completed_at, updated_at
            FROM user_roadmap_progress
            WHERE roadmap_slug = $1
            ORDER BY id
            FOR UPDATE
        "#,
    )
    .bind(roadmap_slug)
    .fetch_all(executor)
    .await
}

/// Create an empty progress record. Returns `false` if one already existed.
pub async fn create_if_missing<'e, E>(
    executor: E,
    user_id: Uuid,
    roadmap_slug: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO user_roadmap_progress (id, user_id, roadmap_slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, roadmap_slug) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(roadmap_slug)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Store new node progress with its recomputed percentage.
///
/// `completed_at` is stamped the first time the roadmap reaches 100 and
/// cleared again when it drops below.
pub async fn save<'e, E>(
    executor: E,
    progress_id: Uuid,
    nodes_progress: &[NodeProgress],
    overall_progress: i32,
) -> Result<UserRoadmapProgress, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE user_roadmap_progress
            SET nodes_progress = $2,
                overall_progress = $3,
                completed_at = CASE
                    WHEN $3 >= 100 THEN COALESCE(completed_at, NOW())
                    ELSE NULL
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, roadmap_slug, nodes_progress, overall_progress,
                      unlocked_via_card_test, started_at, completed_at, updated_at
        "#,
    )
    .bind(progress_id)
    .bind(Json(nodes_progress))
    .bind(overall_progress)
    .fetch_one(executor)
    .await
}

/// Clear node progress. A card-test unlock survives the reset.
pub async fn reset<'e, E>(executor: E, user_id: Uuid, roadmap_slug: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE user_roadmap_progress
            SET nodes_progress = '[]'::jsonb,
                overall_progress = 0,
                completed_at = NULL,
                updated_at = NOW()
            WHERE user_id = $1 AND roadmap_slug = $2
        "#,
    )
    .bind(user_id)
    .bind(roadmap_slug)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Overall progress per roadmap slug for the given slugs; missing records are omitted.
pub async fn overall_for_slugs<'e, E>(
    executor: E,
    user_id: Uuid,
    slugs: &[String],
) -> Result<Vec<(String, i32)>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT roadmap_slug, overall_progress
            FROM user_roadmap_progress
            WHERE user_id = $1 AND roadmap_slug = ANY($2)
        "#,
    )
    .bind(user_id)
    .bind(slugs)
    .fetch_all(executor)
    .await
}

/// Set the card-test unlock flag, creating the progress record if needed.
///
/// Returns `true` when a new record was created.
pub async fn mark_unlocked_via_card_test<'e, E>(
    executor: E,
    user_id: Uuid,
    roadmap_slug: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO user_roadmap_progress (id, user_id, roadmap_slug, unlocked_via_card_test)
            VALUES ($1, $2, $3, true)
            ON CONFLICT (user_id, roadmap_slug)
            DO UPDATE SET
                unlocked_via_card_test = true,
                updated_at = NOW()
            RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(roadmap_slug)
    .fetch_one(executor)
    .await
}
