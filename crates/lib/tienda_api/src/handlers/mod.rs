//! Request handlers.

pub mod admin;
pub mod auth;
pub mod health;
pub mod profile;

use crate::error::ApiError;

/// Fallback for unmatched routes — keeps 404s on the JSON envelope.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("no such route".into())
}
