//! Maps the typed domain errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::common::DirectoryError;

/// Wrapper so `DirectoryError` can flow out of handlers with `?`.
pub struct ApiError(pub DirectoryError);

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        ApiError(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            DirectoryError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DirectoryError::InvalidCoordinates => (StatusCode::BAD_REQUEST, "invalid_coordinates"),
            DirectoryError::InvalidRadius => (StatusCode::BAD_REQUEST, "invalid_radius"),
            DirectoryError::InvalidBounds => (StatusCode::BAD_REQUEST, "invalid_bounds"),
            DirectoryError::InvalidFilterValue(_) => {
                (StatusCode::BAD_REQUEST, "invalid_filter_value")
            }
            DirectoryError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            DirectoryError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            DirectoryError::IllegalTransition { .. } => {
                (StatusCode::CONFLICT, "illegal_transition")
            }
            DirectoryError::StaleState => (StatusCode::CONFLICT, "stale_state"),
            DirectoryError::Database(_) | DirectoryError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorBody { error: code, message })).into_response()
    }
}
