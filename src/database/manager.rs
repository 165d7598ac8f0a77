use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection pool for the database shared with the auth service.
///
/// The pool connects lazily, so a frontend without a reachable database
/// still serves the auth pages.
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    pool: Option<PgPool>,
}

impl DatabaseManager {
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let Some(url) = config.url.as_deref() else {
            return Ok(Self::disabled());
        };

        let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(url)?;

        info!(
            "Database pool configured for {}{}",
            parsed.host_str().unwrap_or("localhost"),
            parsed.path()
        );
        Ok(Self { pool: Some(pool) })
    }

    /// Manager without a database; every query reports missing configuration
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    pub fn is_configured(&self) -> bool {
        self.pool.is_some()
    }

    pub fn pool(&self) -> Result<&PgPool, DatabaseError> {
        self.pool.as_ref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(self.pool()?).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
