//! API server configuration.

use tienda_core::auth::jwt::resolve_jwt_secret;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Google OAuth client ID; when set, token audiences are checked
    /// against it.
    pub google_client_id: Option<String>,
    /// Frontend origin allowed for credentialed CORS.
    pub frontend_origin: String,
    /// Whether this deployment is production (drives the cookie `Secure`
    /// attribute).
    pub production: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable           | Default                                 |
    /// |--------------------|-----------------------------------------|
    /// | `BIND_ADDR`        | `127.0.0.1:3100`                        |
    /// | `DATABASE_URL`     | `postgres://localhost:5432/tienda`      |
    /// | `JWT_SECRET`       | generated & persisted to file           |
    /// | `GOOGLE_CLIENT_ID` | unset (audience check disabled)         |
    /// | `FRONTEND_ORIGIN`  | `http://localhost:3000`                 |
    /// | `APP_ENV`          | anything but `production` is dev        |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3100".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/tienda".into()),
            jwt_secret: resolve_jwt_secret(),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID")
                .ok()
                .filter(|v| !v.is_empty()),
            frontend_origin: std::env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            production: std::env::var("APP_ENV").is_ok_and(|v| v == "production"),
        }
    }
}
