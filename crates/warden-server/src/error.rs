//! Mapping of domain errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;
use warden_core::error::WardenError;

#[derive(Debug)]
pub struct ApiError(pub WardenError);

impl From<WardenError> for ApiError {
    fn from(err: WardenError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            WardenError::Validation { .. } => StatusCode::BAD_REQUEST,
            WardenError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            WardenError::AlreadyExists { .. } => StatusCode::CONFLICT,
            WardenError::NotFound { .. } => StatusCode::NOT_FOUND,
            WardenError::Notification(_) => StatusCode::BAD_GATEWAY,
            WardenError::Configuration(_)
            | WardenError::Database(_)
            | WardenError::Crypto(_)
            | WardenError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side failures are logged in full and reported generically.
        let message = if status.is_server_error() {
            error!(status = status.as_u16(), "request failed: {}", self.0);
            match status {
                StatusCode::BAD_GATEWAY => "upstream service unavailable".to_string(),
                _ => "internal server error".to_string(),
            }
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
