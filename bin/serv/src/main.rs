use std::{net::SocketAddr, time::Duration};

use axum::{Router, middleware, routing::get};
use dsa_api::{
    config::ApiConfig, make_rate_limit_layer, middleware::rate_limit, state::ApiState,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    dsa_api::tracing::init_tracing(&config.env);

    let metrics_handle = dsa_api::metrics::init_metrics()?;
    tracing::info!("Prometheus metrics exporter initialized");

    let pool = dsa_db::create_pool(&config.database_url, config.db_max_connections).await?;
    dsa_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    let state = ApiState::new(&config, pool);

    let _job_handles = dsa_api::jobs::start_background_jobs(
        state.pool.clone(),
        Duration::from_secs(config.stats_refresh_secs),
    );
    tracing::info!(
        every_secs = config.stats_refresh_secs,
        "Background jobs started (roadmap stats refresh)"
    );

    let cors = dsa_api::middleware::cors::create_cors_layer(&config.allowed_origins);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Metrics stay outside the general rate limit so scrapes are never refused
    let metrics_app = Router::new()
        .route("/metrics", get(dsa_api::metrics::metrics_handler))
        .with_state(metrics_handle);

    let app = dsa_api::router::router()
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_PERIOD_MS,
            rate_limit::GENERAL_BURST_SIZE
        ))
        .with_state(state)
        .merge(metrics_app)
        .layer(cors)
        .layer(trace_layer)
        .layer(middleware::from_fn(dsa_api::metrics::track_metrics))
        .layer(middleware::from_fn(
            dsa_api::middleware::request_id::request_id_middleware,
        ));

    let app = dsa_api::middleware::security_headers::apply_security_headers(app, config.env);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, env = ?config.env, "Server listening");

    // Rate limiting falls back to the peer address when no proxy header is set
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
