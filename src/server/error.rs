//! JSON error responses for the HTTP surface

use crate::HeroscopeError;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

/// Error body: `{"status":"error","error":{"message":..,"type":..}}`
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: String,
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

/// Status code plus error body, returned by every failing handler
#[derive(Debug)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub error: ApiError,
}

impl ApiErrorResponse {
    pub fn new(status: StatusCode, error_type: &str, message: impl Into<String>) -> Self {
        ApiErrorResponse {
            status,
            error: ApiError {
                status: "error".to_string(),
                error: ErrorDetails {
                    message: message.into(),
                    error_type: error_type.to_string(),
                },
            },
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}: {}", self.error.error.error_type, self.error.error.message);
        } else {
            warn!("{}: {}", self.error.error.error_type, self.error.error.message);
        }
        let json = Json(self.error);
        (self.status, json).into_response()
    }
}

impl From<HeroscopeError> for ApiErrorResponse {
    fn from(err: HeroscopeError) -> Self {
        let (status, error_type) = match &err {
            HeroscopeError::ValidationError(_) => (StatusCode::BAD_REQUEST, "ValidationError"),
            HeroscopeError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            HeroscopeError::QueryError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "QueryError"),
            HeroscopeError::RenderError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RenderError"),
            HeroscopeError::ConnectionError(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "ConnectionError")
            }
            HeroscopeError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalError")
            }
        };
        ApiErrorResponse::new(status, error_type, err.to_string())
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        ApiErrorResponse::new(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            rejection.body_text(),
        )
    }
}
