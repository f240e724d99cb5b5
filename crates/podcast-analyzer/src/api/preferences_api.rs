//! Preference read and update endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::api::ApiError;
use crate::cache_management::fingerprint;
use crate::error::validate_identifier;
use crate::shared_state::AppState;
use crate::store::Preferences;

#[derive(Debug, Serialize)]
pub struct UpdatePreferencesResponse {
    pub status: String,
    pub message: String,
    /// Fingerprint future analyses for this user are cached under
    pub fingerprint: String,
}

pub async fn get_preferences(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Preferences>, ApiError> {
    let Path(user_id) = path?;
    let preferences = state.preferences.resolve(&user_id).await?;
    Ok(Json(preferences))
}

/// Replace a user's preferences wholesale. Creates the user if needed.
pub async fn update_preferences(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Preferences>, JsonRejection>,
) -> Result<Json<UpdatePreferencesResponse>, ApiError> {
    let Path(user_id) = path?;
    validate_identifier("user_id", &user_id)?;
    let Json(preferences) = payload?;
    preferences.validate().map_err(crate::error::AnalyzerError::from)?;

    state.preferences.put(&user_id, &preferences).await?;
    let fingerprint = fingerprint(&preferences);
    info!("Preferences updated for {} (fingerprint {})", user_id, fingerprint);

    Ok(Json(UpdatePreferencesResponse {
        status: "success".to_string(),
        message: "Preferences updated".to_string(),
        fingerprint,
    }))
}
