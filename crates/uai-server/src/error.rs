//! Errors surfaced by the workflows and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use uai_auth::TokenError;

/// Why a caller was not authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidToken,
    ExpiredToken,
    InvalidCredentials,
}

impl AuthFailure {
    fn code(&self) -> &'static str {
        match self {
            AuthFailure::InvalidToken => "invalid_token",
            AuthFailure::ExpiredToken => "expired_token",
            AuthFailure::InvalidCredentials => "invalid_credentials",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthFailure::InvalidToken => "invalid or missing authentication token",
            AuthFailure::ExpiredToken => "token has expired",
            AuthFailure::InvalidCredentials => "invalid authentication credentials",
        }
    }
}

/// Coarse error kinds returned to callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// A write referenced a row that does not exist.
    #[error("{0}")]
    ReferentialViolation(String),

    #[error("{}", .0.message())]
    Unauthenticated(AuthFailure),

    #[error("{field}: {message}")]
    InvalidArgument { field: String, message: String },

    /// The workflow did not finish within the request deadline.
    #[error("request timed out")]
    Timeout,

    /// Anything else. The cause is logged, never returned.
    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ServiceError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        ServiceError::Internal(err.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Conflict(_) => "already_exists",
            ServiceError::ReferentialViolation(_) => "referential_violation",
            ServiceError::Unauthenticated(failure) => failure.code(),
            ServiceError::InvalidArgument { .. } => "invalid_argument",
            ServiceError::Timeout => "timeout",
            ServiceError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Conflict(_) | ServiceError::ReferentialViolation(_) => {
                StatusCode::CONFLICT
            }
            ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ServiceError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => ServiceError::Unauthenticated(AuthFailure::InvalidToken),
            TokenError::Expired => ServiceError::Unauthenticated(AuthFailure::ExpiredToken),
            other => ServiceError::internal(other),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let ServiceError::Internal(cause) = &self {
            tracing::error!(error = ?cause, "request failed");
        }

        let status = self.status();
        let mut body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        if let ServiceError::InvalidArgument { field, .. } = &self {
            body["error"]["field"] = json!(field);
        }

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}
