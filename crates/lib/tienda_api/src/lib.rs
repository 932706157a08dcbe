//! # tienda_api
//!
//! HTTP API library for the Tienda storefront: registration, login,
//! Google sign-in, password reset, profile, and session transport.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;

use crate::config::ApiConfig;
use crate::services::google::GoogleVerifier;

/// Shared application state passed to all handlers.
///
/// Constructed once at process start; the pool is the only shared mutable
/// resource and is safe for concurrent use.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Google ID-token verifier.
    pub google: GoogleVerifier,
}

/// Run embedded database migrations.
///
/// Delegates to `tienda_core::migrate::migrate()` which owns the
/// migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tienda_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // The cookie transport needs credentialed CORS, which rules out a
    // wildcard origin.
    let origin = state
        .config
        .frontend_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/health", get(handlers::health::health_handler))
        .route("/auth/register", post(handlers::auth::register_handler))
        .route("/auth/login", post(handlers::auth::login_handler))
        .route(
            "/auth/google-login",
            post(handlers::auth::google_login_handler),
        )
        .route(
            "/auth/reset-password",
            post(handlers::auth::reset_password_handler),
        );

    // Protected routes (require a valid session)
    let protected = Router::new()
        .route("/auth/profile", get(handlers::profile::profile_handler))
        .route("/auth/logout", post(handlers::auth::logout_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // Admin routes (require a valid session with the ADMIN role)
    let admin = Router::new()
        .route("/admin/users", get(handlers::admin::list_users_handler))
        .layer(axum::middleware::from_fn(middleware::auth::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(admin)
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::guard::page_guard,
        ))
        .layer(cors)
        .with_state(state)
}
