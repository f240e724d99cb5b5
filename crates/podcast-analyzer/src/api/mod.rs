//! API module - HTTP handlers for podcasts, analyses, preferences and ratings

pub mod admin_api;
pub mod analyze_api;
pub mod podcast_api;
pub mod preferences_api;
pub mod rating_api;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::AnalyzerError;

// Re-export API handlers
pub use admin_api::{cache_stats, clear_cache, clear_podcast_cache, health, HealthResponse};
pub use analyze_api::{analyze_podcast, AnalyzeQuery};
pub use podcast_api::list_podcasts;
pub use preferences_api::{get_preferences, update_preferences, UpdatePreferencesResponse};
pub use rating_api::{list_ratings, submit_rating, RatingResponse};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Error returned by every handler, rendered as `{"error", "code"}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<AnalyzerError> for ApiError {
    fn from(e: AnalyzerError) -> Self {
        let status = match &e {
            AnalyzerError::NotFound(_) => StatusCode::NOT_FOUND,
            AnalyzerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AnalyzerError::Parse(_) | AnalyzerError::Backend(_) => StatusCode::BAD_GATEWAY,
            AnalyzerError::Io(_) | AnalyzerError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed ({}): {}", e.kind(), e);
        }
        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, format!("Invalid query: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), format!("Invalid path: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AnalyzerError::not_found("x"), StatusCode::NOT_FOUND),
            (AnalyzerError::invalid("x"), StatusCode::BAD_REQUEST),
            (AnalyzerError::parse("x"), StatusCode::BAD_GATEWAY),
            (AnalyzerError::Backend("x".into()), StatusCode::BAD_GATEWAY),
            (
                AnalyzerError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }
}
