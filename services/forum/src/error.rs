//! Custom error types for the forum service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the forum service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or invalid input
    #[error("{0}")]
    Validation(String),

    /// Missing post, reply, user, or vote target
    #[error("{0}")]
    NotFound(String),

    /// Caller is not the owning author
    #[error("{0}")]
    Forbidden(String),

    /// Unexpected backend failure; the message passes through to the client
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for forum results
pub type ApiResult<T> = Result<T, ApiError>;
