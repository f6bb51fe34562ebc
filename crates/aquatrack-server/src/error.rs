//! HTTP error mapping
//!
//! One response type covers the whole taxonomy: validation failures rejected
//! before the store is touched, missing rows, ownership violations, and
//! store failures. Store details go to the log, never to the client.

use crate::services::ServiceError;
use aquatrack_core::CoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Validation { field: String, message: String },
    Unauthorized(String),
    Forbidden,
    NotFound(&'static str),
    Conflict(&'static str),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": message,
                    "field": field,
                    "code": "validation"
                }),
            ),
            ApiError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": message,
                    "code": "unauthorized"
                }),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "You do not own this record",
                    "code": "forbidden"
                }),
            ),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": format!("{} not found", what),
                    "code": "not_found"
                }),
            ),
            ApiError::Conflict(message) => (
                StatusCode::CONFLICT,
                json!({
                    "error": message,
                    "code": "conflict"
                }),
            ),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal server error",
                        "code": "internal"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation { field, message } => ApiError::Validation { field, message },
            other => ApiError::Internal(anyhow::anyhow!(other)),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Invalid(core) => core.into(),
            ServiceError::NotFound(what) => ApiError::NotFound(what),
            ServiceError::Serde(e) => ApiError::Internal(e.into()),
            ServiceError::Store(e) => ApiError::Internal(e),
        }
    }
}
