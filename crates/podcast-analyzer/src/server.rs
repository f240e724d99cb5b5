//! HTTP server startup and routing
//!
//! All handlers share one `AppState`; the only network call leaving the
//! process is the optional live LLM request.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::{api, config::Config, metrics, shared_state::AppState};

/// Run the HTTP API until ctrl-c
pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    crate::metrics::init_metrics();
    cfg.print_config();

    let addr = cfg.api_addr()?;
    let state = AppState::from_config(cfg)?;

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

async fn count_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.counters.inc_total_requests();
    next.run(request).await
}

/// Router with every API route and the shared middleware stack
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
        ])
        .allow_headers(Any);
    let request_timeout = Duration::from_secs(state.config.request_timeout_seconds);

    Router::new()
        .route("/api/podcasts", get(api::list_podcasts))
        .route("/api/analyze/:podcast_id", get(api::analyze_podcast))
        .route(
            "/api/preferences/:user_id",
            get(api::get_preferences).post(api::update_preferences),
        )
        .route("/api/rating", post(api::submit_rating))
        .route("/api/rating/:user_id", get(api::list_ratings))
        .route("/api/cache/stats", get(api::cache_stats))
        .route("/api/cache", delete(api::clear_cache))
        .route("/api/cache/:podcast_id", delete(api::clear_podcast_cache))
        .route("/api/health", get(api::health))
        .route("/healthz", get(|| async { "OK" }))
        .route("/metrics", get(metrics::get_metrics))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(middleware::from_fn_with_state(state.clone(), count_requests))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
