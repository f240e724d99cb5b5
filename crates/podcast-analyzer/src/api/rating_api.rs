//! Rating submission and listing endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Serialize;
use validator::Validate;

use crate::api::ApiError;
use crate::error::{validate_identifier, AnalyzerError};
use crate::shared_state::AppState;
use crate::store::{RatingRecord, RatingSubmission};

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub status: String,
    pub message: String,
    pub rating_id: String,
}

/// Append a rating. Never touches cached analyses.
pub async fn submit_rating(
    State(state): State<AppState>,
    payload: Result<Json<RatingSubmission>, JsonRejection>,
) -> Result<Json<RatingResponse>, ApiError> {
    let Json(submission) = payload?;
    validate_identifier("user_id", &submission.user_id)?;
    validate_identifier("podcast_id", &submission.podcast_id)?;
    submission.validate().map_err(AnalyzerError::from)?;

    let record = RatingRecord::from_submission(submission);
    state.ratings.append(&record).await?;
    state.counters.inc_ratings_recorded();

    Ok(Json(RatingResponse {
        status: "success".to_string(),
        message: "Rating submitted".to_string(),
        rating_id: record.rating_id,
    }))
}

/// A user's ratings in submission order
pub async fn list_ratings(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<RatingRecord>>, ApiError> {
    let Path(user_id) = path?;
    let ratings = state.ratings.list_for_user(&user_id).await?;
    Ok(Json(ratings))
}
