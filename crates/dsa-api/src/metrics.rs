//! Prometheus metrics for request traffic and learning events.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

static UUID_SEGMENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}").ok()
});
static NUMBER_SEGMENT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"/\d+(/|$)").ok());

/// Install the Prometheus recorder
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Middleware recording request count, latency and in-flight requests
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let in_flight = gauge!("http_requests_in_flight", "method" => method.clone(), "path" => path.clone());
    in_flight.increment(1.0);

    let response = next.run(req).await;

    in_flight.decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Replace UUIDs and numeric ids so the `path` label stays low-cardinality.
///
/// Roadmap slugs are left alone; the set of roadmaps is small and curated.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.to_string();
    if let Some(re) = UUID_SEGMENT.as_ref() {
        normalized = re.replace_all(&normalized, ":id").into_owned();
    }
    if let Some(re) = NUMBER_SEGMENT.as_ref() {
        normalized = re.replace_all(&normalized, "/:id$1").into_owned();
    }
    normalized
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// Record a graded quiz attempt
pub fn record_quiz_attempt(is_card_test: bool, passed: bool) {
    counter!(
        "quiz_attempts_total",
        "card_test" => is_card_test.to_string(),
        "passed" => passed.to_string()
    )
    .increment(1);
}

/// Record a submission rejected by the retake cooldown
pub fn record_quiz_cooldown_rejection() {
    counter!("quiz_cooldown_rejections_total").increment(1);
}

/// Record a roadmap unlocked by passing its card test
pub fn record_card_test_unlock() {
    counter!("card_test_unlocks_total").increment(1);
}

/// Record a progress mutation; `kind` is "subtopic", "node" or "reset"
pub fn record_progress_update(kind: &'static str, roadmap_completed: bool) {
    counter!(
        "progress_updates_total",
        "kind" => kind,
        "roadmap_completed" => roadmap_completed.to_string()
    )
    .increment(1);
}

/// Record a run of the stats refresh job
pub fn record_stats_refresh(success: bool, roadmaps_changed: u64) {
    let status = if success { "success" } else { "error" };
    counter!("stats_refresh_runs_total", "status" => status).increment(1);
    counter!("stats_refresh_roadmaps_changed_total").increment(roadmaps_changed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/api/roadmaps/quiz/attempts/550e8400-e29b-41d4-a716-446655440000"),
            "/api/roadmaps/quiz/attempts/:id"
        );
        assert_eq!(normalize_path("/api/items/123"), "/api/items/:id");
        assert_eq!(normalize_path("/api/items/123/sub/456"), "/api/items/:id/sub/:id");
        assert_eq!(normalize_path("/api/roadmaps/arrays-101"), "/api/roadmaps/arrays-101");
        assert_eq!(normalize_path("/health"), "/health");
    }
}
