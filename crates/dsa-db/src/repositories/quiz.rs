use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::models::{LastAttempt, QuizBankEntry, QuizBankInput, QuizResult, QuizResultInsert, QuizResultSummary};

// ---------------------------------------------------------------------------
// Quiz bank
// ---------------------------------------------------------------------------

pub async fn list_bank<'e, E>(executor: E, roadmap_slug: &str) -> Result<Vec<QuizBankEntry>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, roadmap_slug, quiz_id, quiz_name, is_card_test, time_limit_seconds,
                   questions, created_at, updated_at
            FROM quiz_bank
            WHERE roadmap_slug = $1
            ORDER BY quiz_id
        "#,
    )
    .bind(roadmap_slug)
    .fetch_all(executor)
    .await
}

pub async fn find_bank<'e, E>(
    executor: E,
    roadmap_slug: &str,
    quiz_id: &str,
) -> Result<Option<QuizBankEntry>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, roadmap_slug, quiz_id, quiz_name, is_card_test, time_limit_seconds,
                   questions, created_at, updated_at
            FROM quiz_bank
            WHERE roadmap_slug = $1 AND quiz_id = $2
        "#,
    )
    .bind(roadmap_slug)
    .bind(quiz_id)
    .fetch_optional(executor)
    .await
}

pub async fn create_bank<'e, E>(executor: E, input: &QuizBankInput) -> Result<QuizBankEntry, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO quiz_bank (id, roadmap_slug, quiz_id, quiz_name, is_card_test, time_limit_seconds, questions)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, roadmap_slug, quiz_id, quiz_name, is_card_test, time_limit_seconds,
                      questions, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&input.roadmap_slug)
    .bind(&input.quiz_id)
    .bind(&input.quiz_name)
    .bind(input.is_card_test)
    .bind(input.time_limit_seconds)
    .bind(Json(&input.questions))
    .fetch_one(executor)
    .await
}

pub async fn update_bank<'e, E>(
    executor: E,
    id: Uuid,
    input: &QuizBankInput,
) -> Result<Option<QuizBankEntry>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE quiz_bank
            SET roadmap_slug = $2,
                quiz_id = $3,
                quiz_name = $4,
                is_card_test = $5,
                time_limit_seconds = $6,
                questions = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, roadmap_slug, quiz_id, quiz_name, is_card_test, time_limit_seconds,
                      questions, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&input.roadmap_slug)
    .bind(&input.quiz_id)
    .bind(&input.quiz_name)
    .bind(input.is_card_test)
    .bind(input.time_limit_seconds)
    .bind(Json(&input.questions))
    .fetch_optional(executor)
    .await
}

pub async fn delete_bank<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM quiz_bank WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Attempts
// ---------------------------------------------------------------------------

/// Serialize attempt submissions for one (user, roadmap, quiz) until the transaction ends.
pub async fn lock_attempts<'e, E>(
    executor: E,
    user_id: Uuid,
    roadmap_slug: &str,
    quiz_id: &str,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            SELECT pg_advisory_xact_lock(hashtextextended($1, 0))
        "#,
    )
    .bind(format!("quiz:{user_id}:{roadmap_slug}:{quiz_id}"))
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn last_attempt<'e, E>(
    executor: E,
    user_id: Uuid,
    roadmap_slug: &str,
    quiz_id: &str,
) -> Result<LastAttempt, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT MAX(attempt_number) AS max_attempt_number,
                   MAX(completed_at) AS last_completed_at
            FROM quiz_results
            WHERE user_id = $1 AND roadmap_slug = $2 AND quiz_id = $3
        "#,
    )
    .bind(user_id)
    .bind(roadmap_slug)
    .bind(quiz_id)
    .fetch_one(executor)
    .await
}

pub async fn insert_result<'e, E>(executor: E, result: &QuizResultInsert) -> Result<QuizResult, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO quiz_results (
                id, user_id, roadmap_slug, quiz_id, attempt_number, score, total_questions,
                percentage, passed, time_taken, answers, is_card_test, card_progress_impact
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, user_id, roadmap_slug, quiz_id, attempt_number, score, total_questions,
                      percentage, passed, time_taken, completed_at, answers, is_card_test,
                      card_progress_impact
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(result.user_id)
    .bind(&result.roadmap_slug)
    .bind(&result.quiz_id)
    .bind(result.attempt_number)
    .bind(result.score)
    .bind(result.total_questions)
    .bind(result.percentage)
    .bind(result.passed)
    .bind(result.time_taken)
    .bind(Json(&result.answers))
    .bind(result.is_card_test)
    .bind(result.card_progress_impact.map(Json))
    .fetch_one(executor)
    .await
}

/// A user's attempts, newest first, optionally for one roadmap.
pub async fn list_results<'e, E>(
    executor: E,
    user_id: Uuid,
    roadmap_slug: Option<&str>,
) -> Result<Vec<QuizResultSummary>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, roadmap_slug, quiz_id, attempt_number, score, total_questions,
                   percentage, passed, time_taken, completed_at, is_card_test
            FROM quiz_results
            WHERE user_id = $1 AND ($2::text IS NULL OR roadmap_slug = $2)
            ORDER BY completed_at DESC
        "#,
    )
    .bind(user_id)
    .bind(roadmap_slug)
    .fetch_all(executor)
    .await
}

/// One attempt, scoped to its owner.
pub async fn find_result<'e, E>(
    executor: E,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<QuizResult>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, roadmap_slug, quiz_id, attempt_number, score, total_questions,
                   percentage, passed, time_taken, completed_at, answers, is_card_test,
                   card_progress_impact
            FROM quiz_results
            WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn delete_result<'e, E>(executor: E, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM quiz_results WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
