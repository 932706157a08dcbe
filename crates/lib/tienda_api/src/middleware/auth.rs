//! Session recovery — Bearer header or session cookie, verified JWT.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use tienda_core::auth::jwt::verify_session_token;
use tienda_core::models::{Role, SessionClaims};

use crate::AppState;
use crate::error::ApiError;
use crate::services::cookies::SESSION_COOKIE;

/// Verified claims for the current request, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionClaims);

/// Pull the raw token from `Authorization: Bearer` or the session cookie.
pub fn extract_token(request: &Request) -> Option<String> {
    if let Some(header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        && let Some(token) = header.strip_prefix("Bearer ")
    {
        return Some(token.to_string());
    }
    CookieJar::from_headers(request.headers())
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

/// Axum middleware: recovers the session token, verifies it, and injects
/// [`CurrentUser`] into request extensions. Expired sessions report
/// differently from invalid or garbled tokens.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&request)
        .ok_or_else(|| ApiError::Unauthorized("missing credentials".into()))?;

    let claims = verify_session_token(&token, state.config.jwt_secret.as_bytes())
        .map_err(ApiError::from)?;

    request.extensions_mut().insert(CurrentUser(claims));
    Ok(next.run(request).await)
}

/// Axum middleware layered inside [`require_auth`]: rejects sessions
/// without the ADMIN role.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(CurrentUser(claims)) = request.extensions().get::<CurrentUser>().cloned() else {
        return Err(ApiError::Unauthorized("missing credentials".into()));
    };
    if claims.role != Role::Admin {
        return Err(ApiError::Forbidden("admin role required".into()));
    }
    Ok(next.run(request).await)
}
