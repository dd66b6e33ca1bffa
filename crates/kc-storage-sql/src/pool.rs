//! Database connection pool management.
//!
//! One [`DatabaseService`] owns the `PostgreSQL` pool for the whole
//! process. Every gateway call checks a connection out of the pool and
//! returns it when the call completes, on success and failure alike.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use kc_core::config::DatabaseConfig;
use kc_storage::StorageError;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::error::from_sqlx_error;
use crate::role::PgRoleRepository;

/// Database pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of connections.
    pub max_connections: u32,
    /// Minimum number of idle connections.
    pub min_connections: u32,
    /// Connection acquisition timeout.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Idle connection timeout.
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,
    /// Maximum connection lifetime.
    #[serde(with = "humantime_serde")]
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl PoolConfig {
    /// Sets the maximum number of connections.
    #[must_use]
    pub const fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    #[must_use]
    pub const fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the idle timeout.
    #[must_use]
    pub const fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

/// Builds `PostgreSQL` connect options from the normalized configuration.
///
/// # Errors
///
/// Returns `StorageError::Connection` if the URL cannot be parsed.
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, StorageError> {
    let mut options = PgConnectOptions::from_str(config.connection_url())
        .map_err(|e| StorageError::Connection(format!("invalid database URL: {e}")))?
        .username(&config.username);
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    Ok(options)
}

/// Owner of the shared connection pool.
#[derive(Debug)]
pub struct DatabaseService {
    pool: PgPool,
    closed: AtomicBool,
}

impl DatabaseService {
    /// Connects a new pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created.
    pub async fn connect(config: &DatabaseConfig, pool: &PoolConfig) -> Result<Self, StorageError> {
        let options = connect_options(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(pool.max_connections)
            .min_connections(pool.min_connections)
            .acquire_timeout(pool.connect_timeout)
            .idle_timeout(Some(pool.idle_timeout))
            .max_lifetime(Some(pool.max_lifetime))
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        tracing::info!(
            username = %config.username,
            driver = %config.driver,
            "Role store connection pool initialized"
        );
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a role repository over the shared pool.
    #[must_use]
    pub fn role_repository(&self) -> PgRoleRepository {
        PgRoleRepository::new(self.pool.clone())
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::migrate::MigrateError::Execute(err) => from_sqlx_error(err),
                other => StorageError::Internal(other.to_string()),
            })
    }

    /// Closes the pool. Only the first call has an effect.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.pool.close().await;
        tracing::info!("Role store connections closed");
    }

    /// Returns whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
