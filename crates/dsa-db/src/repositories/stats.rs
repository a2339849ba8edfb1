use sqlx::{Executor, Postgres};

use crate::models::DashboardCounts;

pub async fn dashboard_counts<'e, E>(executor: E) -> Result<DashboardCounts, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM roadmaps) AS total_roadmaps,
                (SELECT COUNT(*) FROM roadmaps WHERE published) AS published_roadmaps,
                (SELECT COUNT(*) FROM quiz_results) AS total_attempts,
                (SELECT COUNT(*) FROM quiz_results WHERE passed) AS passed_attempts,
                (SELECT COUNT(DISTINCT user_id) FROM user_roadmap_progress) AS active_learners
        "#,
    )
    .fetch_one(executor)
    .await
}
