//! REST handler module
//!
//! Shared pieces for the endpoint handlers: the JSON error body, the
//! handler-side error type mapping store failures onto status codes,
//! and client-token extraction for echo suppression.

pub mod items;
pub mod lists;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::StoreError;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "NOT_FOUND".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "BAD_REQUEST".to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "INTERNAL_ERROR".to_string(),
        }
    }
}

/// Handler-side failure; converts store errors into HTTP responses so
/// handlers can use `?`.
#[derive(Debug)]
pub enum ApiFailure {
    Store(StoreError),
    BadRequest(String),
}

impl From<StoreError> for ApiFailure {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        match self {
            Self::Store(StoreError::NotFound(what)) => (
                StatusCode::NOT_FOUND,
                Json(ApiError::not_found(format!("{what} not found"))),
            )
                .into_response(),
            Self::Store(StoreError::InvalidPosition(position)) => (
                StatusCode::BAD_REQUEST,
                Json(ApiError::bad_request(format!(
                    "invalid position {position}: positions are 1-based"
                ))),
            )
                .into_response(),
            Self::Store(StoreError::Persistence(err)) => {
                error!(error = %err, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiError::internal("database failure")),
                )
                    .into_response()
            }
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ApiError::bad_request(message))).into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiFailure>;

/// Query parameters accepted by every mutating endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ClientParams {
    /// Originating-client token for echo suppression
    pub client_id: Option<String>,
}

/// Extract the client token from the `X-Client-Id` header, falling
/// back to the `client_id` query parameter.
pub fn client_token(headers: &HeaderMap, params: &ClientParams) -> Option<String> {
    if let Some(header) = headers.get("X-Client-Id") {
        if let Ok(token) = header.to_str() {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    params.client_id.clone()
}
