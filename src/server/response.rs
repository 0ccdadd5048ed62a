use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Error;

/// Standard API response wrapper: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// API error that converts to `{ "success": false, "error": ... }` with a
/// proper status code.
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound => Self::not_found("Not found"),
            Error::InvalidGraphName(_) | Error::VersionLookup(_) => {
                Self::not_found(err.to_string())
            }
            Error::BadRequest(message) => Self::bad_request(message),
            Error::Parse { .. } => Self::bad_request(err.to_string()),
            Error::Composition(errors) => {
                let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
                Self::internal(format!("schema composition failed: {}", details.join("; ")))
            }
            Error::Database(_) | Error::Storage(_) | Error::Io(_) | Error::Config(_) => {
                tracing::error!("request failed: {err}");
                Self::internal("storage failure")
            }
        }
    }
}
