use sqlx::{Executor, Postgres, types::Json};

use crate::models::{MasterRoadmap, MasterYear};

pub async fn find<'e, E>(executor: E, master_id: &str) -> Result<Option<MasterRoadmap>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT master_id, title, description, years, updated_at
            FROM master_roadmaps
            WHERE master_id = $1
        "#,
    )
    .bind(master_id)
    .fetch_optional(executor)
    .await
}

pub async fn upsert<'e, E>(
    executor: E,
    master_id: &str,
    title: &str,
    description: &str,
    years: &[MasterYear],
) -> Result<MasterRoadmap, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO master_roadmaps (master_id, title, description, years)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (master_id)
            DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                years = EXCLUDED.years,
                updated_at = NOW()
            RETURNING master_id, title, description, years, updated_at
        "#,
    )
    .bind(master_id)
    .bind(title)
    .bind(description)
    .bind(Json(years))
    .fetch_one(executor)
    .await
}
