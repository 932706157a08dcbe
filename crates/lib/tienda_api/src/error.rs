//! Application error types and the JSON error envelope.
//!
//! Every failure leaving this crate is one of the typed variants below;
//! raw driver and library errors are logged and replaced with a generic
//! message before they reach a client.

use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use tienda_core::auth::{AuthError, TokenError};

/// Convenience alias for handler return types.
pub type ApiResult<T> = Result<T, ApiError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Authentication-flow failures that are the caller's fault but not
    /// a credential mismatch (duplicate email, provider conflicts).
    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal server error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m),
            ApiError::Auth(m) => (StatusCode::BAD_REQUEST, "auth_error", m),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m),
            ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m),
            ApiError::Internal(detail) => {
                error!(detail = %detail, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error".to_string(),
                )
            }
        };
        let body = Json(json!({
            "success": false,
            "error": { "type": kind, "message": message },
        }));
        (status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => ApiError::Unauthorized("invalid credentials".into()),
            AuthError::EmailAlreadyExists => ApiError::Auth("email already registered".into()),
            AuthError::WrongProvider(p) => {
                ApiError::Auth(format!("this account signs in with {p}"))
            }
            AuthError::ProviderConflict(p) => ApiError::Auth(format!(
                "an account with this email already exists and signs in with {p}"
            )),
            AuthError::NotFound => ApiError::NotFound("account not found".into()),
            AuthError::Validation(m) => ApiError::Validation(m),
            AuthError::Token(t) => ApiError::from(t),
            AuthError::Db(e) => ApiError::Internal(e.to_string()),
            AuthError::Internal(m) => ApiError::Internal(m),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        // Expired sessions report differently from forged or garbled
        // tokens; all three are 401.
        ApiError::Unauthorized(e.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// JSON body extractor whose rejection is the standard error envelope
/// (400) instead of axum's plain-text default.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
