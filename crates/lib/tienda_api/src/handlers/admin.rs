//! Admin handlers.

use axum::Json;
use axum::extract::State;

use tienda_core::models::PublicUser;

use crate::AppState;
use crate::error::ApiResult;
use crate::services::auth;

/// `GET /admin/users` — list every account. Admin only.
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = auth::list_users(&state.pool).await?;
    Ok(Json(users))
}
