//! Podcast listing endpoint

use axum::{extract::State, Json};
use tracing::info;

use crate::api::ApiError;
use crate::shared_state::AppState;
use crate::store::PodcastSummary;

/// Every known podcast, sorted by id
pub async fn list_podcasts(State(state): State<AppState>) -> Result<Json<Vec<PodcastSummary>>, ApiError> {
    let podcasts = state.transcripts.list().await?;
    info!("Listing {} podcasts", podcasts.len());
    Ok(Json(podcasts))
}
