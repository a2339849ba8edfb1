use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::User;

/// Record a user seen through a verified token.
///
/// Identity is owned by the auth provider, so the row is created on first
/// sight and its email, name and role refreshed afterwards.
pub async fn upsert_seen<'e, E>(
    executor: E,
    user_id: Uuid,
    email: &str,
    name: Option<&str>,
    role: &str,
) -> Result<User, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO users (id, email, name, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                email = EXCLUDED.email,
                name = COALESCE(EXCLUDED.name, users.name),
                role = EXCLUDED.role,
                last_seen_at = NOW()
            RETURNING id, email, name, role, created_at, last_seen_at
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(name)
    .bind(role)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, user_id: Uuid) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, email, name, role, created_at, last_seen_at
            FROM users
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}
