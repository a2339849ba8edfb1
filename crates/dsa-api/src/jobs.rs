//! Background jobs for periodic maintenance tasks.
//!
//! Request handlers bump `followers` and `total_nodes` as they go. The stats
//! job recomputes both from source rows so the denormalized counters recover
//! from deletes and from anything written outside the API.

use std::time::Duration;

use sqlx::PgPool;
use tokio::time::{MissedTickBehavior, interval};

use crate::metrics;

/// Start all background jobs
///
/// Returns the join handles so the caller can abort them on shutdown
pub fn start_background_jobs(pool: PgPool, stats_refresh: Duration) -> Vec<tokio::task::JoinHandle<()>> {
    vec![tokio::spawn(periodic_stats_refresh_job(pool, stats_refresh))]
}

async fn periodic_stats_refresh_job(pool: PgPool, every: Duration) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        refresh_roadmap_stats(&pool).await;
    }
}

/// Recompute roadmap stats once, logging the outcome.
pub async fn refresh_roadmap_stats(pool: &PgPool) {
    match dsa_db::repositories::roadmap::refresh_all_stats(pool).await {
        Ok(changed) if changed > 0 => {
            tracing::info!(roadmaps = changed, "Roadmap stats refreshed");
            metrics::record_stats_refresh(true, changed);
        }
        Ok(_) => {
            tracing::debug!("Roadmap stats already up to date");
            metrics::record_stats_refresh(true, 0);
        }
        Err(e) => {
            tracing::error!("Failed to refresh roadmap stats: {}", e);
            metrics::record_stats_refresh(false, 0);
        }
    }
}
