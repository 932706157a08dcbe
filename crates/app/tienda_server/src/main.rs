//! Tienda auth API server binary.
//!
//! Owns the process lifecycle: config, pool, migrations, bind, graceful
//! shutdown, pool close.

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use tienda_api::config::ApiConfig;
use tienda_api::services::google::GoogleVerifier;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "tienda_server", about = "Tienda auth API server")]
struct Args {
    /// Address to bind (host:port).
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3100")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/tienda"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tienda_api=debug,tienda_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    config.bind_addr = args.bind_addr;
    config.database_url = args.database_url;

    info!(
        database_url = %config.database_url,
        bind_addr = %config.bind_addr,
        max_connections = args.max_connections,
        "starting tienda_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    tienda_api::migrate(&pool).await?;

    let google = GoogleVerifier::new(config.google_client_id.clone())?;

    let state = tienda_api::AppState {
        pool: pool.clone(),
        config: config.clone(),
        google,
    };

    let app = tienda_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain in-flight queries before the process exits.
    pool.close().await;
    info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
