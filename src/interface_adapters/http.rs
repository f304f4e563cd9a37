// Shared HTTP response types for consistent API error payloads.

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};

use crate::use_cases::RegistryError;

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string for consistent JSON error responses.
    pub error: String,
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = match self {
            RegistryError::AlreadyExists => StatusCode::CONFLICT,
            RegistryError::NotFound => StatusCode::NOT_FOUND,
            RegistryError::SessionClosed => StatusCode::GONE,
            RegistryError::Config(_) => StatusCode::BAD_REQUEST,
        };
        error_response(status, self.to_string())
    }
}
