//! Provider factories.
//!
//! The host creates one factory of each kind at startup and calls it for
//! every session. Both factories share a [`SharedDatabase`], so the
//! process holds a single connection pool whichever factory connects
//! first.
//!
//! ## Lifecycle
//!
//! 1. `init()` - called once with process properties and environment
//! 2. `post_init()` - called after all factories are initialized
//! 3. `create()` - called per session
//! 4. `close()` - called at shutdown

use std::sync::Arc;

use kc_core::config::{ConfigSources, DatabaseConfig};
use kc_storage_sql::{DatabaseService, PoolConfig};
use tokio::sync::OnceCell;

use crate::config::{database_properties, ComponentModel, ConfigProperty, ProviderConfig};
use crate::error::{FederationError, FederationResult};
use crate::host::HostModel;
use crate::listener::RoleEventListener;
use crate::provider::RoleStorageProvider;

/// Factory id of the role storage provider.
pub const ROLE_STORAGE_PROVIDER_ID: &str = "simple-mysql-role-storage";

/// Factory id of the role event listener.
pub const ROLE_EVENT_LISTENER_ID: &str = "custom-role-event-listener";

/// Process-wide database service, connected at most once.
#[derive(Debug)]
pub struct SharedDatabase {
    service: OnceCell<Arc<DatabaseService>>,
    pool: PoolConfig,
    migrate: bool,
}

impl SharedDatabase {
    /// Creates an unconnected handle.
    #[must_use]
    pub fn new(pool: PoolConfig) -> Self {
        Self {
            service: OnceCell::new(),
            pool,
            migrate: true,
        }
    }

    /// Disables schema migration on connect.
    #[must_use]
    pub const fn without_migrations(mut self) -> Self {
        self.migrate = false;
        self
    }

    /// Returns the service, connecting with `config` on first use.
    ///
    /// Concurrent first callers wait for a single connection attempt.
    /// A failed attempt leaves the handle unconnected so a later call
    /// can retry.
    ///
    /// # Errors
    ///
    /// Returns a storage error if connecting or migrating fails.
    pub async fn get_or_init(&self, config: &DatabaseConfig) -> FederationResult<Arc<DatabaseService>> {
        let service = self
            .service
            .get_or_try_init(|| async {
                tracing::info!(username = %config.username, driver = %config.driver, "Connecting role store");
                let service = DatabaseService::connect(config, &self.pool).await?;
                if self.migrate {
                    service.migrate().await?;
                }
                Ok::<_, FederationError>(Arc::new(service))
            })
            .await?;
        Ok(Arc::clone(service))
    }

    /// Returns the service if connected.
    #[must_use]
    pub fn get(&self) -> Option<Arc<DatabaseService>> {
        self.service.get().cloned()
    }

    /// Returns whether a connection has been established.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.service.initialized()
    }

    /// Closes the pool if connected. Later calls do nothing.
    pub async fn close(&self) {
        if let Some(service) = self.service.get() {
            service.close().await;
        }
    }
}

impl Default for SharedDatabase {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// Creates [`RoleStorageProvider`]s for configured components.
#[derive(Debug)]
pub struct RoleStorageProviderFactory {
    database: Arc<SharedDatabase>,
    sources: ConfigSources,
}

impl RoleStorageProviderFactory {
    /// Creates a factory over a shared database handle.
    #[must_use]
    pub fn new(database: Arc<SharedDatabase>) -> Self {
        Self {
            database,
            sources: ConfigSources::new(),
        }
    }

    /// Returns the factory id.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        ROLE_STORAGE_PROVIDER_ID
    }

    /// Returns the help text shown in the admin console.
    #[must_use]
    pub const fn help_text(&self) -> &'static str {
        "Role storage provider backed by an external PostgreSQL database"
    }

    /// Returns the component settings.
    #[must_use]
    pub fn config_properties(&self) -> Vec<ConfigProperty> {
        database_properties()
    }

    /// Initializes the factory.
    ///
    /// Connects eagerly when process properties or the environment
    /// already hold a complete database configuration; otherwise the
    /// connection is made when the first component is created.
    pub async fn init(&mut self, sources: ConfigSources) {
        self.sources = sources;
        connect_eagerly(&self.database, &self.sources, self.id()).await;
    }

    /// Logs whether the database is ready.
    pub fn post_init(&self) {
        if self.database.is_initialized() {
            tracing::info!(factory = self.id(), "Role store is ready");
        } else {
            tracing::info!(factory = self.id(), "Role store will connect when a component is created");
        }
    }

    /// Creates a provider for a component.
    ///
    /// Component settings take precedence over process properties and
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the component id is invalid, the database
    /// configuration is incomplete, or connecting fails.
    pub async fn create(
        &self,
        component: &ComponentModel,
        host: Arc<dyn HostModel>,
    ) -> FederationResult<RoleStorageProvider> {
        let config = ProviderConfig::from_component(component);
        config.validate()?;

        let service = match self.database.get() {
            Some(service) => service,
            None => {
                let sources = self.sources.clone().with_component(component.config.clone());
                let database = DatabaseConfig::resolve(&sources)?;
                self.database.get_or_init(&database).await?
            }
        };

        tracing::info!(component_id = %component.id, name = %component.name, "Creating role storage provider");
        Ok(RoleStorageProvider::new(
            config,
            Arc::new(service.role_repository()),
            host,
        ))
    }

    /// Closes the shared database.
    pub async fn close(&self) {
        tracing::info!(factory = self.id(), "Closing factory");
        self.database.close().await;
    }
}

/// Creates [`RoleEventListener`]s.
#[derive(Debug)]
pub struct RoleEventListenerFactory {
    database: Arc<SharedDatabase>,
    sources: ConfigSources,
}

impl RoleEventListenerFactory {
    /// Creates a factory over a shared database handle.
    #[must_use]
    pub fn new(database: Arc<SharedDatabase>) -> Self {
        Self {
            database,
            sources: ConfigSources::new(),
        }
    }

    /// Returns the factory id.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        ROLE_EVENT_LISTENER_ID
    }

    /// Initializes the factory.
    pub async fn init(&mut self, sources: ConfigSources) {
        self.sources = sources;
        connect_eagerly(&self.database, &self.sources, self.id()).await;
    }

    /// Creates a listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the database configuration is incomplete or
    /// connecting fails.
    pub async fn create(&self, host: Arc<dyn HostModel>) -> FederationResult<RoleEventListener> {
        let service = match self.database.get() {
            Some(service) => service,
            None => {
                let database = DatabaseConfig::resolve(&self.sources)?;
                self.database.get_or_init(&database).await?
            }
        };
        Ok(RoleEventListener::new(Arc::new(service.role_repository()), host))
    }

    /// Closes the shared database.
    pub async fn close(&self) {
        tracing::info!(factory = self.id(), "Closing factory");
        self.database.close().await;
    }
}

async fn connect_eagerly(database: &SharedDatabase, sources: &ConfigSources, factory: &str) {
    if database.is_initialized() {
        return;
    }
    let config = match DatabaseConfig::resolve(sources) {
        Ok(config) => config,
        Err(err) => {
            tracing::info!(factory, reason = %err, "Deferring role store connection");
            return;
        }
    };
    if let Err(err) = database.get_or_init(&config).await {
        tracing::warn!(factory, error = %err, "Failed to connect role store, will retry on create");
    }
}
