//! Ephemeral local PostgreSQL for integration tests.
//!
//! Spawns `initdb`, `pg_ctl`, and `pg_isready` as child processes against
//! a temporary data directory. Callers that find no PostgreSQL install on
//! PATH get a typed error and can skip.

use std::net::TcpListener;
use std::path::PathBuf;
use std::time::Duration;

use sqlx::postgres::PgPool;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::sleep;

/// Database name created inside the ephemeral instance.
const TEST_DATABASE: &str = "tienda";

/// Maximum time to wait for PostgreSQL to become ready.
const PG_READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll interval when waiting for PostgreSQL readiness.
const PG_READY_POLL: Duration = Duration::from_millis(200);

/// Errors that can occur while managing the ephemeral instance.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("PostgreSQL command failed: {0}")]
    Command(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pg_config not found on PATH")]
    PgConfigNotFound,

    #[error("PostgreSQL not ready after {0:?}")]
    ReadyTimeout(Duration),
}

/// Result type for database lifecycle operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// A throwaway PostgreSQL instance whose data directory lives in a
/// tempdir and disappears on drop.
pub struct LocalDb {
    bin_dir: PathBuf,
    data_dir: PathBuf,
    port: u16,
    started: bool,
    /// Holds the tempdir so it lives as long as the instance.
    _tempdir: tempfile::TempDir,
}

impl LocalDb {
    /// Discover PG binaries via `pg_config --bindir` and stage a tempdir.
    pub async fn ephemeral() -> Result<Self> {
        let output = Command::new("pg_config")
            .arg("--bindir")
            .output()
            .await
            .map_err(|_| DbError::PgConfigNotFound)?;

        if !output.status.success() {
            return Err(DbError::PgConfigNotFound);
        }

        let bin_dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let tempdir = tempfile::tempdir()?;
        let data_dir = tempdir.path().join("pgdata");

        Ok(Self {
            bin_dir: PathBuf::from(bin_dir),
            data_dir,
            port: 0,
            started: false,
            _tempdir: tempdir,
        })
    }

    /// Initialize the data directory. Safe to call twice.
    pub async fn setup(&mut self) -> Result<()> {
        if self.data_dir.join("PG_VERSION").exists() {
            return Ok(());
        }

        let initdb = self.bin_dir.join("initdb");
        let output = Command::new(&initdb)
            .arg("-D")
            .arg(&self.data_dir)
            .arg("--no-locale")
            .arg("--encoding=UTF8")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("initdb failed: {stderr}")));
        }
        Ok(())
    }

    /// Start the server on a free port and create the test database.
    pub async fn start(&mut self) -> Result<()> {
        if self.port == 0 {
            self.port = find_free_port()?;
        }

        let pg_ctl = self.bin_dir.join("pg_ctl");
        let port_opt = format!(
            "-p {} -k {} -h localhost",
            self.port,
            self.data_dir.display()
        );
        let logfile = self.data_dir.join("postgresql.log");

        let output = Command::new(&pg_ctl)
            .arg("-D")
            .arg(&self.data_dir)
            .arg("-o")
            .arg(&port_opt)
            .arg("-l")
            .arg(&logfile)
            .arg("start")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("pg_ctl start failed: {stderr}")));
        }

        self.wait_for_ready().await?;
        self.started = true;
        self.create_database_if_missing().await?;
        Ok(())
    }

    /// Stop the server gracefully.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }

        let pg_ctl = self.bin_dir.join("pg_ctl");
        let output = Command::new(&pg_ctl)
            .arg("-D")
            .arg(&self.data_dir)
            .arg("-m")
            .arg("fast")
            .arg("stop")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("pg_ctl stop failed: {stderr}")));
        }

        self.started = false;
        Ok(())
    }

    /// Connection URL for the test database.
    pub fn connection_url(&self) -> String {
        format!("postgresql://localhost:{}/{}", self.port, TEST_DATABASE)
    }

    /// Port the server is listening on (0 if not yet assigned).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the server has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Wait for PostgreSQL to become ready, polling `pg_isready`.
    async fn wait_for_ready(&self) -> Result<()> {
        let pg_isready = self.bin_dir.join("pg_isready");
        let deadline = tokio::time::Instant::now() + PG_READY_TIMEOUT;

        loop {
            let output = Command::new(&pg_isready)
                .arg("-p")
                .arg(self.port.to_string())
                .arg("-h")
                .arg("localhost")
                .output()
                .await?;

            if output.status.success() {
                return Ok(());
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(DbError::ReadyTimeout(PG_READY_TIMEOUT));
            }

            sleep(PG_READY_POLL).await;
        }
    }

    /// Create the test database if it doesn't exist.
    async fn create_database_if_missing(&self) -> Result<()> {
        let maintenance_url = format!("postgresql://localhost:{}/postgres", self.port);
        let pool = PgPool::connect(&maintenance_url).await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
                .bind(TEST_DATABASE)
                .fetch_one(&pool)
                .await?;

        if !exists {
            // CREATE DATABASE cannot use bind parameters
            let sql = format!("CREATE DATABASE \"{TEST_DATABASE}\"");
            sqlx::query(&sql).execute(&pool).await?;
        }

        pool.close().await;
        Ok(())
    }
}

/// Find a free ephemeral port by binding to port 0.
fn find_free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lifecycle_setup_start_stop() -> Result<()> {
        let Ok(mut db) = LocalDb::ephemeral().await else {
            eprintln!("skipping: PostgreSQL not available on PATH");
            return Ok(());
        };

        db.setup().await?;
        assert!(!db.is_started());

        db.start().await?;
        assert!(db.is_started());
        assert_ne!(0, db.port());

        let url = db.connection_url();
        assert!(url.starts_with("postgresql://"));
        assert!(url.contains("tienda"));

        db.stop().await?;
        assert!(!db.is_started());

        Ok(())
    }
}
