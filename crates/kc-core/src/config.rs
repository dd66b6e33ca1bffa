//! Database configuration for the external role store.
//!
//! The store is reached through a single normalized
//! `{url, username, password, driver}` tuple. Each field is resolved
//! through a fallback chain:
//!
//! 1. explicit component configuration (set through the admin console),
//! 2. process-level properties,
//! 3. environment variables,
//! 4. a built-in default (driver only).
//!
//! Blank values are treated as absent at every step.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Keys consulted by the fallback chain.
pub mod keys {
    /// Component configuration key for the database URL.
    pub const COMPONENT_URL: &str = "dbUrl";
    /// Component configuration key for the database username.
    pub const COMPONENT_USERNAME: &str = "dbUsername";
    /// Component configuration key for the database password.
    pub const COMPONENT_PASSWORD: &str = "dbPassword";
    /// Component configuration key for the database driver.
    pub const COMPONENT_DRIVER: &str = "dbDriver";

    /// Process property for the database URL.
    pub const PROPERTY_URL: &str = "quarkus.datasource.user-store.jdbc.url";
    /// Process property for the database username.
    pub const PROPERTY_USERNAME: &str = "quarkus.datasource.user-store.username";
    /// Process property for the database password.
    pub const PROPERTY_PASSWORD: &str = "quarkus.datasource.user-store.password";
    /// Process property for the database kind.
    pub const PROPERTY_DB_KIND: &str = "quarkus.datasource.user-store.db-kind";

    /// Environment variable for the database URL.
    pub const ENV_URL: &str = "DB_URL";
    /// Environment variable for the database username.
    pub const ENV_USERNAME: &str = "DB_USERNAME";
    /// Environment variable for the database password.
    pub const ENV_PASSWORD: &str = "DB_PASSWORD";
    /// Environment variable for the database driver.
    pub const ENV_DRIVER: &str = "DB_DRIVER";
}

/// Supported database drivers.
///
/// The SQL gateway is built on `SQLx` with the `PostgreSQL` backend, so
/// only `PostgreSQL` is accepted. Both driver class names and bare
/// database kinds normalize to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// `PostgreSQL`.
    #[default]
    Postgres,
}

impl DatabaseDriver {
    /// Returns the canonical kind name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgresql",
        }
    }
}

impl FromStr for DatabaseDriver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "org.postgresql.driver" => Ok(Self::Postgres),
            _ => Err(Error::UnsupportedDriver(s.trim().to_string())),
        }
    }
}

impl fmt::Display for DatabaseDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The configuration layers consulted by [`DatabaseConfig::resolve`].
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Component configuration (highest priority).
    pub component: HashMap<String, String>,
    /// Process-level properties.
    pub properties: HashMap<String, String>,
    /// Environment variables (lowest priority before defaults).
    pub environment: HashMap<String, String>,
}

impl ConfigSources {
    /// Creates empty configuration sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the process environment, loading a `.env` file first if present.
    #[must_use]
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(err) if err.not_found() => tracing::debug!("No .env file found"),
            Err(err) => tracing::debug!(error = %err, "Could not read .env file"),
        }
        Self {
            environment: std::env::vars().collect(),
            ..Self::default()
        }
    }

    /// Replaces the component configuration layer.
    #[must_use]
    pub fn with_component(mut self, component: HashMap<String, String>) -> Self {
        self.component = component;
        self
    }

    /// Sets a single component configuration value.
    #[must_use]
    pub fn component_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.component.insert(key.into(), value.into());
        self
    }

    /// Sets a single process property.
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Sets a single environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Returns the first non-blank value along the chain.
    #[must_use]
    pub fn lookup(&self, component_key: &str, property_key: &str, env_key: &str) -> Option<&str> {
        [
            self.component.get(component_key),
            self.properties.get(property_key),
            self.environment.get(env_key),
        ]
        .into_iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
    }
}

/// Normalized database connection settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (JDBC-style URLs are accepted).
    pub url: String,
    /// Username.
    pub username: String,
    /// Password.
    pub password: Option<String>,
    /// Driver / dialect.
    pub driver: DatabaseDriver,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("driver", &self.driver)
            .finish()
    }
}

impl DatabaseConfig {
    /// Creates a configuration for the given URL and username.
    #[must_use]
    pub fn new(url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: None,
            driver: DatabaseDriver::default(),
        }
    }

    /// Sets the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the driver.
    #[must_use]
    pub const fn with_driver(mut self, driver: DatabaseDriver) -> Self {
        self.driver = driver;
        self
    }

    /// Resolves the configuration through the fallback chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL or username cannot be found
    /// in any layer, and [`Error::UnsupportedDriver`] if the driver is
    /// not `PostgreSQL`.
    pub fn resolve(sources: &ConfigSources) -> Result<Self> {
        let url = sources
            .lookup(keys::COMPONENT_URL, keys::PROPERTY_URL, keys::ENV_URL)
            .ok_or_else(|| Error::config("database URL is not configured"))?;
        let username = sources
            .lookup(
                keys::COMPONENT_USERNAME,
                keys::PROPERTY_USERNAME,
                keys::ENV_USERNAME,
            )
            .ok_or_else(|| Error::config("database username is not configured"))?;
        let password = sources.lookup(
            keys::COMPONENT_PASSWORD,
            keys::PROPERTY_PASSWORD,
            keys::ENV_PASSWORD,
        );
        let driver = sources
            .lookup(
                keys::COMPONENT_DRIVER,
                keys::PROPERTY_DB_KIND,
                keys::ENV_DRIVER,
            )
            .map_or(Ok(DatabaseDriver::default()), DatabaseDriver::from_str)?;

        Ok(Self {
            url: url.to_string(),
            username: username.to_string(),
            password: password.map(ToString::to_string),
            driver,
        })
    }

    /// Returns the URL in the form the `SQLx` driver expects.
    ///
    /// `jdbc:postgresql://host/db` becomes `postgresql://host/db`.
    #[must_use]
    pub fn connection_url(&self) -> &str {
        self.url.strip_prefix("jdbc:").unwrap_or(&self.url)
    }
}
