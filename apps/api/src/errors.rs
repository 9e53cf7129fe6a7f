use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::api_client::ApiError;
use crate::progression::ProgressionError;
use crate::review::ReviewError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every error body carries `transient`: true means a dismissible notice the
/// learner may retry, false means the request itself was invalid.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Progression(#[from] ProgressionError),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error("Course API error: {0}")]
    Upstream(#[from] ApiError),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, bool) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), false),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                false,
            ),
            AppError::Progression(e) => match e {
                ProgressionError::InaccessibleLesson { .. } => {
                    (StatusCode::CONFLICT, "INACCESSIBLE_LESSON", e.to_string(), false)
                }
                ProgressionError::RequestInFlight { .. } => {
                    (StatusCode::CONFLICT, "REQUEST_IN_FLIGHT", e.to_string(), true)
                }
                ProgressionError::StaleResponse { .. } => {
                    (StatusCode::CONFLICT, "STALE_RESPONSE", e.to_string(), true)
                }
                ProgressionError::TransientNetworkFailure(_) => (
                    StatusCode::BAD_GATEWAY,
                    "TRANSIENT_NETWORK_FAILURE",
                    "Could not reach the course service. Please try again.".to_string(),
                    true,
                ),
            },
            AppError::Review(e) => match e {
                ReviewError::InvalidRating(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_RATING", e.to_string(), false)
                }
                ReviewError::CommentTooLong { .. } => {
                    (StatusCode::BAD_REQUEST, "COMMENT_TOO_LONG", e.to_string(), false)
                }
                ReviewError::NotEligible { .. } => {
                    (StatusCode::FORBIDDEN, "REVIEW_NOT_ALLOWED", e.to_string(), false)
                }
                ReviewError::DuplicateReview => {
                    (StatusCode::CONFLICT, "DUPLICATE_REVIEW", e.to_string(), true)
                }
                ReviewError::RequestInFlight => {
                    (StatusCode::CONFLICT, "REQUEST_IN_FLIGHT", e.to_string(), true)
                }
                ReviewError::StaleResponse => {
                    (StatusCode::CONFLICT, "STALE_RESPONSE", e.to_string(), true)
                }
                ReviewError::TransientNetworkFailure(_) => (
                    StatusCode::BAD_GATEWAY,
                    "TRANSIENT_NETWORK_FAILURE",
                    "Could not reach the course service. Please try again.".to_string(),
                    true,
                ),
            },
            AppError::Upstream(ApiError::Api { status: 404, message }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone(), false)
            }
            AppError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "The course service returned an error. Please try again.".to_string(),
                true,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, transient) = self.parts();

        match &self {
            AppError::Upstream(ApiError::Parse(e)) => {
                tracing::error!("Course API returned an unreadable body: {e}")
            }
            AppError::Upstream(e) => tracing::warn!("Course API error: {e}"),
            _ if transient => tracing::warn!("{code}: {self}"),
            _ => tracing::debug!("{code}: {self}"),
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "transient": transient
            }
        }));

        (status, body).into_response()
    }
}
