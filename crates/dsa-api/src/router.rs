use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{admin, master, profile, progress, quiz, roadmap, state::ApiState};

pub fn router() -> Router<ApiState> {
    let api = Router::new()
        .merge(roadmap::routes())
        .merge(progress::routes())
        .merge(quiz::routes())
        .merge(master::routes())
        .merge(profile::routes())
        .merge(admin::routes());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .nest("/api", api)
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Ready once the database answers
async fn ready(State(state): State<ApiState>) -> StatusCode {
    match dsa_db::ping(&state.pool).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
