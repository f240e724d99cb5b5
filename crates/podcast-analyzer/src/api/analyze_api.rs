//! Analysis endpoint: cached when possible, otherwise one generator call

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::analysis::AnalysisResult;
use crate::api::ApiError;
use crate::shared_state::AppState;
use crate::store::DEFAULT_USER_ID;

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_use_cache() -> bool {
    true
}

pub async fn analyze_podcast(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Path(podcast_id) = path?;
    let Query(query) = query?;
    info!(
        "Analyze request for {} (user {}, use_cache {})",
        podcast_id, query.user_id, query.use_cache
    );

    let result = state
        .analysis
        .analyze(&podcast_id, &query.user_id, query.use_cache)
        .await?;
    state.counters.inc_analyses_served();
    Ok(Json(result))
}
