//! Health and cache administration endpoints
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::api::ApiError;
use crate::cache_management::CacheStats;
use crate::error::validate_identifier;
use crate::shared_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub model: String,
    pub uptime_seconds: u64,
    pub total_requests: usize,
    pub analyses_served: usize,
    pub ratings_recorded: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub status: String,
    pub removed: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (total_requests, analyses_served, ratings_recorded) = state.counters.snapshot();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "Podcast Analyzer API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.analysis.model_name().to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        total_requests,
        analyses_served,
        ratings_recorded,
    })
}

pub async fn cache_stats(State(state): State<AppState>) -> Result<Json<CacheStats>, ApiError> {
    Ok(Json(state.cache.stats().await?))
}

pub async fn clear_cache(State(state): State<AppState>) -> Result<Json<ClearCacheResponse>, ApiError> {
    let removed = state.cache.clear().await?;
    info!("Admin cleared the analysis cache ({} entries)", removed);
    Ok(Json(ClearCacheResponse {
        status: "success".to_string(),
        removed,
    }))
}

pub async fn clear_podcast_cache(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    let Path(podcast_id) = path?;
    validate_identifier("podcast_id", &podcast_id)?;
    let removed = state.cache.clear_podcast(&podcast_id).await?;
    Ok(Json(ClearCacheResponse {
        status: "success".to_string(),
        removed,
    }))
}
