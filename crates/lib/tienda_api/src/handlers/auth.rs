//! Authentication request handlers.
//!
//! Thin wrappers over `services::auth`; their only extra duty is the
//! session cookie.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use crate::AppState;
use crate::error::{ApiJson, ApiResult};
use crate::middleware::auth::CurrentUser;
use crate::models::{
    GoogleLoginRequest, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest,
};
use crate::services::{auth, cookies};

/// `POST /auth/register` — create a password-backed account.
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let resp = auth::register(
        &state.pool,
        &body.name,
        &body.email,
        &body.password,
        state.config.jwt_secret.as_bytes(),
    )
    .await?;
    let jar = jar.add(cookies::session_cookie(&resp.token, state.config.production));
    Ok((StatusCode::CREATED, jar, Json(resp)))
}

/// `POST /auth/login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let resp = auth::login(
        &state.pool,
        &body.email,
        &body.password,
        state.config.jwt_secret.as_bytes(),
    )
    .await?;
    let jar = jar.add(cookies::session_cookie(&resp.token, state.config.production));
    Ok((jar, Json(resp)))
}

/// `POST /auth/google-login` — authenticate with a Google ID token.
pub async fn google_login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<GoogleLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let resp = auth::google_login(
        &state.pool,
        &state.google,
        &body.id_token,
        state.config.jwt_secret.as_bytes(),
    )
    .await?;
    let jar = jar.add(cookies::session_cookie(&resp.token, state.config.production));
    Ok((jar, Json(resp)))
}

/// `POST /auth/reset-password` — overwrite a local account's password.
pub async fn reset_password_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    auth::reset_password(&state.pool, &body.email, &body.new_password).await?;
    Ok(Json(MessageResponse {
        message: "password updated".into(),
    }))
}

/// `POST /auth/logout` — clear the session cookie. The token itself has
/// no server-side state to revoke.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(claims)): Extension<CurrentUser>,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    info!(user_id = %claims.sub, "signed out");
    let jar = jar.add(cookies::clear_session_cookie(state.config.production));
    Ok((
        jar,
        Json(MessageResponse {
            message: "signed out".into(),
        }),
    ))
}
