//! Session cookie construction.
//!
//! One httpOnly cookie, named `token`, carries the signed session claims.
//! SameSite is Lax so the OAuth redirect completion can present it.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use tienda_core::auth::jwt::SESSION_TTL_SECS;

/// Cookie name for the session token.
pub const SESSION_COOKIE: &str = "token";

/// Build the httpOnly session cookie. Max-age matches the token expiry.
pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Build an expired cookie that clears the session on the client.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
