//! Authentication and authorization logic.
//!
//! Provides password hashing, session-token management, and the
//! credential-store queries shared by the API layer.

pub mod jwt;
pub mod password;
pub mod queries;

use thiserror::Error;

use crate::models::Provider;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately a single variant so
    /// the two cases stay indistinguishable to callers.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailAlreadyExists,

    /// Local login against an account bound to another provider.
    #[error("this account signs in with {0}")]
    WrongProvider(Provider),

    /// OAuth login over an email already registered under another provider.
    #[error("an account with this email already exists and signs in with {0}")]
    ProviderConflict(Provider),

    #[error("account not found")]
    NotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Outcomes of session-token verification. The three cases stay distinct
/// so callers can report an expired session differently from a forged or
/// garbled token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("session expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("malformed token")]
    Malformed,
}
