//! Profile handler.

use axum::extract::State;
use axum::{Extension, Json};

use tienda_core::models::PublicUser;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::CurrentUser;
use crate::services::auth;

/// `GET /auth/profile` — the public view of the signed-in account.
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(claims)): Extension<CurrentUser>,
) -> ApiResult<Json<PublicUser>> {
    let user_id = claims
        .user_id()
        .ok_or_else(|| ApiError::Unauthorized("invalid token".into()))?;
    let user = auth::profile(&state.pool, user_id).await?;
    Ok(Json(user))
}
