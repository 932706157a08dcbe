//! Health endpoint — bootstrap check for the service and its store.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /api/health` — reports version and database connectivity.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: "ok".into(),
        version: tienda_core::version().into(),
        db_connected,
    })
}
