//! HTTP error types for the darbind server.
//!
//! Maps domain errors from `darbind-core` and `darbind-store` into
//! appropriate HTTP responses. Every error variant produces a JSON body with
//! a machine-readable `error` field and a human-readable `message`.
//!
//! Client errors (401/403/400/409) are never retried server-side; a 500 is
//! logged and left to the browser, which may retry `init` safely because
//! binding is idempotent.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use darbind_core::error::{AuthError, BindError, PathError};
use darbind_store::StoreError;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed, or expired credential.
    Unauthorized(String),
    /// Credential valid but authorizes a different path.
    Forbidden(String),
    /// Client sent an invalid path or parameter.
    BadRequest(String),
    /// Requested resource not found.
    NotFound(String),
    /// Existing alias conflicts with the requested binding.
    Conflict(String),
    /// Internal server error (filesystem failure and the like).
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        // The whole taxonomy is 401: a missing, malformed, forged, or
        // expired credential all read the same to the caller.
        Self::Unauthorized(err.to_string())
    }
}

impl From<PathError> for AppError {
    fn from(err: PathError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<BindError> for AppError {
    fn from(err: BindError) -> Self {
        match err {
            BindError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            BindError::Conflict { .. } => Self::Conflict(err.to_string()),
            BindError::Store(inner) => Self::Internal(inner.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidAlias { .. } => Self::BadRequest(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}
